use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Missing or invalid session")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Content exceeds the plan's per-request word ceiling")]
    ContentTooLong,

    #[error("Daily quota exhausted")]
    QuotaExhausted,

    #[error("Upstream service failure: {0}")]
    UpstreamFailure(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    Unauthenticated,
    InvalidInput,
    ContentTooLong,
    QuotaExhausted,
    UpstreamFailure,
    Conflict,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ContentTooLong => "CONTENT_TOO_LONG",
            ErrorCode::QuotaExhausted => "QUOTA_EXHAUSTED",
            ErrorCode::UpstreamFailure => "UPSTREAM_FAILURE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                "伺服器發生未知錯誤。".to_string(),
            ),
            AppError::Unauthenticated => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthenticated,
                "缺少授權資訊，請重新登入。".to_string(),
            ),
            AppError::ValidationError(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, msg)
            }
            AppError::ContentTooLong => error_resp(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::ContentTooLong,
                "內容超過方案單次字數上限。".to_string(),
            ),
            AppError::QuotaExhausted => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::QuotaExhausted,
                "今日改寫次數已達上限，請明天再試。".to_string(),
            ),
            AppError::UpstreamFailure(_) => error_resp(
                StatusCode::BAD_GATEWAY,
                ErrorCode::UpstreamFailure,
                "上游服務錯誤，請稍後再試。".to_string(),
            ),
            AppError::Conflict(_) => error_resp(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                "資料狀態衝突，請稍後再試。".to_string(),
            ),
            AppError::NotFound => error_resp(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "找不到資源。".to_string(),
            ),
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                "伺服器發生未知錯誤。".to_string(),
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message, "code": code.as_str() });
    (status, Json(body)).into_response()
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::app_error::AppResult;

/// Identity established by the external auth provider for a bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Session verification, delegated entirely to the external auth backend.
/// Sign-up, session issuance and token refresh all live on the provider
/// side; this port only answers "who does this token belong to".
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the token's user, or `AppError::Unauthenticated` if the
    /// provider rejects it.
    async fn verify_token(&self, access_token: &str) -> AppResult<AuthenticatedUser>;
}

pub mod account;
pub mod orders;
pub mod rewrite;
pub mod usage;
pub mod webhooks;

use axum::Router;
use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::ports::auth_provider::AuthenticatedUser,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(rewrite::router())
        .merge(usage::router())
        .merge(account::router())
        .merge(orders::router())
        .merge(webhooks::router())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolves the caller from the `Authorization: Bearer` header.
pub(crate) async fn require_bearer_user(
    app_state: &AppState,
    headers: &HeaderMap,
) -> AppResult<AuthenticatedUser> {
    let token = bearer_token(headers).ok_or(AppError::Unauthenticated)?;
    app_state.auth.verify_token(token).await
}

/// Like `require_bearer_user`, but also accepts the `access_token` cookie
/// set by the web frontend.
pub(crate) async fn require_session_user(
    app_state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> AppResult<AuthenticatedUser> {
    if let Some(token) = bearer_token(headers) {
        return app_state.auth.verify_token(token).await;
    }
    let cookie = jar.get("access_token").ok_or(AppError::Unauthenticated)?;
    app_state.auth.verify_token(cookie.value()).await
}

use async_trait::async_trait;

use crate::app_error::AppResult;

/// The external completion API that performs the actual rewriting.
#[async_trait]
pub trait RewriteEngine: Send + Sync {
    /// Rewrites the text, or fails with `AppError::UpstreamFailure` when the
    /// API returns a non-success status or an empty result.
    async fn rewrite(&self, text: &str) -> AppResult<String>;
}

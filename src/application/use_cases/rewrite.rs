use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{auth_provider::AuthenticatedUser, rewrite_engine::RewriteEngine},
        use_cases::quota::{QuotaUseCases, RecordUsageEvent, resolve_usage_mode},
        words::approximate_word_count,
    },
};

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub rewritten: String,
    pub word_count: usize,
}

pub struct RewriteUseCases {
    quota: Arc<QuotaUseCases>,
    engine: Arc<dyn RewriteEngine>,
}

impl RewriteUseCases {
    pub fn new(quota: Arc<QuotaUseCases>, engine: Arc<dyn RewriteEngine>) -> Self {
        Self { quota, engine }
    }

    pub async fn rewrite(
        &self,
        user: &AuthenticatedUser,
        text: &str,
    ) -> AppResult<RewriteOutcome> {
        self.rewrite_at(user, text, Utc::now()).await
    }

    /// Full gated rewrite: validate, resolve plan, enforce the per-request
    /// word ceiling and the daily counter, call the engine, then account for
    /// the usage. Quota checks run before the engine so a rejected request
    /// never spends upstream tokens.
    pub async fn rewrite_at(
        &self,
        user: &AuthenticatedUser,
        text: &str,
        now: DateTime<Utc>,
    ) -> AppResult<RewriteOutcome> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError("請提供要改寫的內容。".to_string()));
        }

        let plan = self.quota.resolve_active_plan(user.id, now).await?;

        let word_count = approximate_word_count(trimmed);
        if let Some(max_words) = plan.limits.max_words
            && word_count > max_words.max(0) as usize
        {
            return Err(AppError::ContentTooLong);
        }

        let mode = resolve_usage_mode(&plan);
        let date = now.date_naive();
        if let Some(quota) = plan.limits.quota_for(mode) {
            let used = self
                .quota
                .today_usage(user.id, date)
                .await?
                .map(|counter| counter.used_for(mode))
                .unwrap_or(0);
            if used >= quota {
                return Err(AppError::QuotaExhausted);
            }
        }

        let rewritten = self.engine.rewrite(trimmed).await?;

        // Accounting failures must not take back a rewrite the user already
        // received; log and return the result anyway.
        if let Err(e) = self.quota.consume(user.id, date, plan.id, mode).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to update usage counter");
        }
        let event = RecordUsageEvent {
            user_id: user.id,
            plan_id: plan.id,
            mode,
            word_count: word_count.min(i32::MAX as usize) as i32,
            metadata: serde_json::json!({ "input_chars": trimmed.chars().count() }),
        };
        if let Err(e) = self.quota.record_event(&event).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to append usage event");
        }

        Ok(RewriteOutcome {
            rewritten,
            word_count,
        })
    }
}

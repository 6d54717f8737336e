use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::quota::{RecordUsageEvent, UsageEventRepo},
};

#[async_trait]
impl UsageEventRepo for PostgresPersistence {
    async fn append(&self, event: &RecordUsageEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO usage_events (id, user_id, plan_id, mode, word_count, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.user_id)
        .bind(event.plan_id.as_str())
        .bind(event.mode.as_str())
        .bind(event.word_count)
        .bind(&event.metadata)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}

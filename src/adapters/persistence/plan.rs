use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::quota::PlanRepo,
    domain::entities::plan::{Plan, PlanLimits, PlanTier},
};

fn row_to_plan(row: &sqlx::postgres::PgRow) -> Plan {
    Plan {
        id: PlanTier::from_str(&row.get::<String, _>("id")),
        name: row.get("name"),
        limits: PlanLimits {
            max_words: row.get("max_words"),
            ghost_mini_quota: row.get("ghost_mini_quota"),
            ghost_pro_quota: row.get("ghost_pro_quota"),
        },
    }
}

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn get_by_id(&self, id: PlanTier) -> AppResult<Option<Plan>> {
        let row = sqlx::query(
            "SELECT id, name, max_words, ghost_mini_quota, ghost_pro_quota FROM plans WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_plan))
    }
}

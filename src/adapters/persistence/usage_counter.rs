use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::quota::UsageCounterRepo,
    domain::entities::{
        plan::PlanTier,
        usage::{UsageCounter, UsageMode},
    },
};

const SELECT_COLS: &str = "id, user_id, usage_date, plan_id, ghost_mini_used, ghost_pro_used";

fn row_to_counter(row: &sqlx::postgres::PgRow) -> UsageCounter {
    UsageCounter {
        id: row.get("id"),
        user_id: row.get("user_id"),
        usage_date: row.get("usage_date"),
        plan_id: PlanTier::from_str(&row.get::<String, _>("plan_id")),
        ghost_mini_used: row.get("ghost_mini_used"),
        ghost_pro_used: row.get("ghost_pro_used"),
    }
}

#[async_trait]
impl UsageCounterRepo for PostgresPersistence {
    async fn get_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<UsageCounter>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM usage_counters WHERE user_id = $1 AND usage_date = $2",
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_counter))
    }

    async fn insert_first(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        plan_id: PlanTier,
        mode: UsageMode,
    ) -> AppResult<UsageCounter> {
        let (mini, pro) = match mode {
            UsageMode::GhostMini => (1, 0),
            UsageMode::GhostPro => (0, 1),
        };
        let id = Uuid::new_v4();
        // The unique index on (user_id, usage_date) arbitrates concurrent
        // first inserts; the caller retries on Conflict.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO usage_counters
                (id, user_id, usage_date, plan_id, ghost_mini_used, ghost_pro_used)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(user_id)
        .bind(date)
        .bind(plan_id.as_str())
        .bind(mini)
        .bind(pro)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_counter(&row))
    }

    async fn increment(&self, id: Uuid, mode: UsageMode, plan_id: PlanTier) -> AppResult<()> {
        let sql = match mode {
            UsageMode::GhostMini => {
                "UPDATE usage_counters SET ghost_mini_used = ghost_mini_used + 1, plan_id = $2 WHERE id = $1"
            }
            UsageMode::GhostPro => {
                "UPDATE usage_counters SET ghost_pro_used = ghost_pro_used + 1, plan_id = $2 WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(id)
            .bind(plan_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

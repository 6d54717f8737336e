use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{SubscriptionRepo, SubscriptionSync},
    domain::entities::{
        plan::{BillingCycle, PlanTier},
        subscription::{Subscription, SubscriptionStatus},
    },
};

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, status, billing_cycle,
    current_period_start, current_period_end, cancelled_at,
    stripe_subscription_id, stripe_customer_id, created_at, updated_at
"#;

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: PlanTier::from_str(&row.get::<String, _>("plan_id")),
        status: SubscriptionStatus::from_str(&row.get::<String, _>("status")),
        billing_cycle: BillingCycle::from_str(&row.get::<String, _>("billing_cycle")),
        current_period_start: row.get("current_period_start"),
        current_period_end: row.get("current_period_end"),
        cancelled_at: row.get("cancelled_at"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        stripe_customer_id: row.get("stripe_customer_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE user_id = $1 AND status = 'active' AND current_period_end > $2
            ORDER BY current_period_end DESC
            LIMIT 1
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE stripe_subscription_id = $1",
            SELECT_COLS
        ))
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn insert_synced(
        &self,
        user_id: Uuid,
        plan_id: PlanTier,
        sync: &SubscriptionSync,
    ) -> AppResult<Subscription> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions
                (id, user_id, plan_id, status, billing_cycle,
                 current_period_start, current_period_end, cancelled_at,
                 stripe_subscription_id, stripe_customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(user_id)
        .bind(plan_id.as_str())
        .bind(sync.status.as_str())
        .bind(sync.billing_cycle.as_str())
        .bind(sync.current_period_start)
        .bind(sync.current_period_end)
        .bind(sync.cancelled_at)
        .bind(&sync.stripe_subscription_id)
        .bind(&sync.stripe_customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }

    async fn update_synced(&self, id: Uuid, sync: &SubscriptionSync) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE subscriptions SET
                status = $2,
                billing_cycle = $3,
                current_period_start = $4,
                current_period_end = $5,
                cancelled_at = $6,
                stripe_customer_id = COALESCE($7, stripe_customer_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(sync.status.as_str())
        .bind(sync.billing_cycle.as_str())
        .bind(sync.current_period_start)
        .bind(sync.current_period_end)
        .bind(sync.cancelled_at)
        .bind(&sync.stripe_customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }
}

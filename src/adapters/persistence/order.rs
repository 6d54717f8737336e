use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::OrderRepo,
    domain::entities::{
        order::{Order, OrderStatus},
        plan::{BillingCycle, PlanTier},
    },
};

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, cycle, status,
    stripe_link, stripe_session_id, stripe_customer_id, stripe_subscription_id,
    created_at
"#;

fn row_to_order(row: &sqlx::postgres::PgRow) -> Order {
    Order {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: PlanTier::from_str(&row.get::<String, _>("plan_id")),
        cycle: BillingCycle::from_str(&row.get::<String, _>("cycle")),
        status: OrderStatus::from_str(&row.get::<String, _>("status")),
        stripe_link: row.get("stripe_link"),
        stripe_session_id: row.get("stripe_session_id"),
        stripe_customer_id: row.get("stripe_customer_id"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl OrderRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        plan_id: PlanTier,
        cycle: BillingCycle,
    ) -> AppResult<Order> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, user_id, plan_id, cycle, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(user_id)
        .bind(plan_id.as_str())
        .bind(cycle.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_order(&row))
    }

    async fn set_payment_link(&self, id: Uuid, link: &str, session_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE orders SET stripe_link = $2, stripe_session_id = $3 WHERE id = $1")
            .bind(id)
            .bind(link)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        session_id: &str,
        customer_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'paid',
                stripe_session_id = $2,
                stripe_customer_id = COALESCE($3, stripe_customer_id),
                stripe_subscription_id = COALESCE($4, stripe_subscription_id)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(session_id)
        .bind(customer_id)
        .bind(subscription_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_order))
    }

    async fn find_user_by_stripe_customer(&self, customer_id: &str) -> AppResult<Option<Uuid>> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM orders
            WHERE stripe_customer_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(user_id)
    }
}

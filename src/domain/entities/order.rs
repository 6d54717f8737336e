use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::{BillingCycle, PlanTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "paid" => OrderStatus::Paid,
            _ => OrderStatus::Pending,
        }
    }
}

/// A pending-to-paid purchase attempt. The order is the initial link between
/// a user and their payment-platform customer id, before any subscription
/// row exists.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: PlanTier,
    pub cycle: BillingCycle,
    pub status: OrderStatus,
    pub stripe_link: Option<String>,
    pub stripe_session_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

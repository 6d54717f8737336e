use async_trait::async_trait;

use crate::{app_error::AppResult, domain::entities::plan::BillingCycle};

/// Parameters for a hosted checkout session with an inline recurring price.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub product_name: String,
    pub cycle: BillingCycle,
    pub unit_amount_cents: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    /// Threaded through to the webhook as the order reference.
    pub client_reference_id: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// A full subscription object as fetched from the payment platform. Invoice
/// webhook payloads embed only a partial object, so the handler re-fetches
/// through this shape before upserting.
#[derive(Debug, Clone)]
pub struct GatewaySubscription {
    pub id: String,
    pub customer: Option<String>,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at: Option<i64>,
    pub billing_interval: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, params: &CheckoutParams)
    -> AppResult<CheckoutSession>;

    async fn fetch_subscription(&self, subscription_id: &str) -> AppResult<GatewaySubscription>;
}

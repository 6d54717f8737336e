use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        auth_provider::AuthenticatedUser,
        payment_gateway::{CheckoutParams, GatewaySubscription, PaymentGateway},
    },
    domain::entities::{
        order::Order,
        plan::{BillingCycle, PlanTier},
        subscription::{Subscription, SubscriptionStatus},
    },
};

/// Checkout price points for the single paid tier, in cents.
const MONTHLY_PRICE_CENTS: i64 = 799;
const YEARLY_PRICE_CENTS: i64 = 5_900;

const PAID_PLAN_NAME: &str = "StealthWriter Pro";
const CHECKOUT_CURRENCY: &str = "usd";

/// Subscription fields as synchronized from a payment-platform event.
/// Applied via upsert keyed on the external subscription id, so replayed
/// deliveries converge to the same state.
#[derive(Debug, Clone)]
pub struct SubscriptionSync {
    pub stripe_subscription_id: String,
    pub stripe_customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

fn timestamp_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

impl SubscriptionSync {
    pub fn from_gateway(sub: &GatewaySubscription) -> Self {
        SubscriptionSync {
            stripe_subscription_id: sub.id.clone(),
            stripe_customer_id: sub.customer.clone(),
            status: SubscriptionStatus::from_stripe(&sub.status),
            billing_cycle: BillingCycle::from_stripe_interval(
                sub.billing_interval.as_deref().unwrap_or("month"),
            ),
            current_period_start: sub.current_period_start.and_then(timestamp_to_utc),
            current_period_end: sub.current_period_end.and_then(timestamp_to_utc),
            cancelled_at: sub.cancel_at.and_then(timestamp_to_utc),
        }
    }
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, plan_id: PlanTier, cycle: BillingCycle)
    -> AppResult<Order>;

    async fn set_payment_link(&self, id: Uuid, link: &str, session_id: &str) -> AppResult<()>;

    /// Marks the order paid and attaches the external identifiers delivered
    /// with the checkout completion. `NotFound` if no such order exists.
    async fn mark_paid(
        &self,
        id: Uuid,
        session_id: &str,
        customer_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> AppResult<()>;

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Order>>;

    /// Most recent order whose recorded customer id matches. This is the
    /// only path by which user identity reaches a subscription row.
    async fn find_user_by_stripe_customer(&self, customer_id: &str) -> AppResult<Option<Uuid>>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Most recent subscription that is active and whose period has not yet
    /// ended as of `now`.
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Subscription>>;

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>>;

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<Subscription>>;

    async fn insert_synced(
        &self,
        user_id: Uuid,
        plan_id: PlanTier,
        sync: &SubscriptionSync,
    ) -> AppResult<Subscription>;

    async fn update_synced(&self, id: Uuid, sync: &SubscriptionSync) -> AppResult<Subscription>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order_id: Uuid,
    pub payment_link: String,
}

pub struct BillingUseCases {
    order_repo: Arc<dyn OrderRepo>,
    subscription_repo: Arc<dyn SubscriptionRepo>,
    gateway: Arc<dyn PaymentGateway>,
    app_url: Url,
}

impl BillingUseCases {
    pub fn new(
        order_repo: Arc<dyn OrderRepo>,
        subscription_repo: Arc<dyn SubscriptionRepo>,
        gateway: Arc<dyn PaymentGateway>,
        app_url: Url,
    ) -> Self {
        Self {
            order_repo,
            subscription_repo,
            gateway,
            app_url,
        }
    }

    /// Creates a pending order and a hosted checkout session for it. The
    /// order id travels as the session's client reference so the webhook can
    /// mark it paid later.
    pub async fn create_order(
        &self,
        user: &AuthenticatedUser,
        cycle: BillingCycle,
    ) -> AppResult<CreateOrderResult> {
        let order = self
            .order_repo
            .create(user.id, PlanTier::Pro, cycle)
            .await?;

        let base = self.app_url.as_str().trim_end_matches('/').to_string();
        let params = CheckoutParams {
            product_name: PAID_PLAN_NAME.to_string(),
            cycle,
            unit_amount_cents: match cycle {
                BillingCycle::Monthly => MONTHLY_PRICE_CENTS,
                BillingCycle::Yearly => YEARLY_PRICE_CENTS,
            },
            currency: CHECKOUT_CURRENCY.to_string(),
            success_url: format!("{base}/?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/pricing?cancelled=1"),
            customer_email: user.email.clone(),
            client_reference_id: order.id.to_string(),
        };

        let session = self.gateway.create_checkout_session(&params).await?;
        let link = session
            .url
            .ok_or_else(|| AppError::UpstreamFailure("checkout session has no URL".into()))?;

        self.order_repo
            .set_payment_link(order.id, &link, &session.id)
            .await?;

        Ok(CreateOrderResult {
            order_id: order.id,
            payment_link: link,
        })
    }

    pub async fn mark_order_paid(
        &self,
        order_id: Uuid,
        session_id: &str,
        customer_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> AppResult<()> {
        self.order_repo
            .mark_paid(order_id, session_id, customer_id, subscription_id)
            .await
    }

    /// Upserts a local subscription row keyed by the external subscription
    /// id. When no row exists yet, the owning user is backfilled from the
    /// most recent order carrying the same customer id; if that fails the
    /// event is skipped (the platform never carries a local user id).
    pub async fn sync_subscription(
        &self,
        sync: &SubscriptionSync,
    ) -> AppResult<Option<Subscription>> {
        if let Some(existing) = self
            .subscription_repo
            .find_by_stripe_subscription_id(&sync.stripe_subscription_id)
            .await?
        {
            let updated = self
                .subscription_repo
                .update_synced(existing.id, sync)
                .await?;
            return Ok(Some(updated));
        }

        let Some(customer_id) = sync.stripe_customer_id.as_deref() else {
            tracing::warn!(
                stripe_subscription_id = %sync.stripe_subscription_id,
                "Subscription event carries no customer id; cannot attribute"
            );
            return Ok(None);
        };

        let Some(user_id) = self
            .order_repo
            .find_user_by_stripe_customer(customer_id)
            .await?
        else {
            tracing::warn!(
                stripe_subscription_id = %sync.stripe_subscription_id,
                stripe_customer_id = customer_id,
                "No order matches the customer id; subscription has no user yet"
            );
            return Ok(None);
        };

        let created = self
            .subscription_repo
            .insert_synced(user_id, PlanTier::Pro, sync)
            .await?;
        Ok(Some(created))
    }

    /// Invoice events embed a partial subscription object; re-fetch the full
    /// object from the platform and apply the regular upsert.
    pub async fn resync_subscription_from_gateway(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        let sub = self.gateway.fetch_subscription(subscription_id).await?;
        self.sync_subscription(&SubscriptionSync::from_gateway(&sub))
            .await
    }

    pub async fn latest_order(&self, user_id: Uuid) -> AppResult<Option<Order>> {
        self.order_repo.latest_for_user(user_id).await
    }

    pub async fn latest_subscription(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        self.subscription_repo.latest_for_user(user_id).await
    }
}

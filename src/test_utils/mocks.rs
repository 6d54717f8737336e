//! In-memory mock implementations for repository traits and external ports.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            auth_provider::{AuthProvider, AuthenticatedUser},
            payment_gateway::{CheckoutParams, CheckoutSession, GatewaySubscription, PaymentGateway},
            rewrite_engine::RewriteEngine,
        },
        use_cases::{
            billing::{OrderRepo, SubscriptionRepo, SubscriptionSync},
            quota::{PlanRepo, RecordUsageEvent, UsageCounterRepo, UsageEventRepo},
        },
    },
    domain::entities::{
        order::{Order, OrderStatus},
        plan::{BillingCycle, Plan, PlanTier},
        subscription::Subscription,
        usage::{UsageCounter, UsageMode},
    },
    test_utils::default_plans,
};

// ============================================================================
// InMemoryPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPlanRepo {
    pub plans: Mutex<HashMap<PlanTier, Plan>>,
}

impl InMemoryPlanRepo {
    /// An empty catalog; lookups resolve to the hard-coded fallback.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self::with_plans(default_plans())
    }

    pub fn with_plans(plans: Vec<Plan>) -> Self {
        let map: HashMap<PlanTier, Plan> = plans.into_iter().map(|p| (p.id, p)).collect();
        Self {
            plans: Mutex::new(map),
        }
    }
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    async fn get_by_id(&self, id: PlanTier) -> AppResult<Option<Plan>> {
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    // Insertion-ordered; "latest" means last inserted.
    pub subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn apply_sync(sub: &mut Subscription, sync: &SubscriptionSync) {
    sub.status = sync.status;
    sub.billing_cycle = sync.billing_cycle;
    sub.current_period_start = sync.current_period_start;
    sub.current_period_end = sync.current_period_end;
    sub.cancelled_at = sync.cancelled_at;
    if sync.stripe_customer_id.is_some() {
        sub.stripe_customer_id = sync.stripe_customer_id.clone();
    }
    sub.updated_at = Some(Utc::now());
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock().unwrap();
        let mut candidates: Vec<&Subscription> = subscriptions
            .iter()
            .filter(|s| {
                s.user_id == user_id
                    && s.status == crate::domain::entities::subscription::SubscriptionStatus::Active
                    && s.current_period_end.is_some_and(|end| end > now)
            })
            .collect();
        candidates.sort_by_key(|s| std::cmp::Reverse(s.current_period_end));
        Ok(candidates.first().map(|s| (*s).clone()))
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.stripe_subscription_id == stripe_subscription_id)
            .cloned())
    }

    async fn insert_synced(
        &self,
        user_id: Uuid,
        plan_id: PlanTier,
        sync: &SubscriptionSync,
    ) -> AppResult<Subscription> {
        let now = Utc::now();
        let mut subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            status: sync.status,
            billing_cycle: sync.billing_cycle,
            current_period_start: sync.current_period_start,
            current_period_end: sync.current_period_end,
            cancelled_at: sync.cancelled_at,
            stripe_subscription_id: sync.stripe_subscription_id.clone(),
            stripe_customer_id: sync.stripe_customer_id.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        apply_sync(&mut subscription, sync);
        self.subscriptions.lock().unwrap().push(subscription.clone());
        Ok(subscription)
    }

    async fn update_synced(&self, id: Uuid, sync: &SubscriptionSync) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        apply_sync(subscription, sync);
        Ok(subscription.clone())
    }
}

// ============================================================================
// InMemoryOrderRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepo {
    pub orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }
}

#[async_trait]
impl OrderRepo for InMemoryOrderRepo {
    async fn create(
        &self,
        user_id: Uuid,
        plan_id: PlanTier,
        cycle: BillingCycle,
    ) -> AppResult<Order> {
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            cycle,
            status: OrderStatus::Pending,
            stripe_link: None,
            stripe_session_id: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: Some(Utc::now()),
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn set_payment_link(&self, id: Uuid, link: &str, session_id: &str) -> AppResult<()> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(AppError::NotFound)?;
        order.stripe_link = Some(link.to_string());
        order.stripe_session_id = Some(session_id.to_string());
        Ok(())
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        session_id: &str,
        customer_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> AppResult<()> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(AppError::NotFound)?;
        order.status = OrderStatus::Paid;
        order.stripe_session_id = Some(session_id.to_string());
        if let Some(customer_id) = customer_id {
            order.stripe_customer_id = Some(customer_id.to_string());
        }
        if let Some(subscription_id) = subscription_id {
            order.stripe_subscription_id = Some(subscription_id.to_string());
        }
        Ok(())
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|o| o.user_id == user_id)
            .cloned())
    }

    async fn find_user_by_stripe_customer(&self, customer_id: &str) -> AppResult<Option<Uuid>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|o| o.stripe_customer_id.as_deref() == Some(customer_id))
            .map(|o| o.user_id))
    }
}

// ============================================================================
// InMemoryUsageCounterRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUsageCounterRepo {
    pub counters: Mutex<Vec<UsageCounter>>,
    racing_insert: AtomicBool,
}

impl InMemoryUsageCounterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot race: the next `insert_first` behaves as if another
    /// request won the insert first. The row appears but the caller gets
    /// `Conflict`, exercising the re-read-and-increment path.
    pub fn simulate_racing_insert(&self) {
        self.racing_insert.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.counters.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UsageCounterRepo for InMemoryUsageCounterRepo {
    async fn get_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<UsageCounter>> {
        Ok(self
            .counters
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.usage_date == date)
            .cloned())
    }

    async fn insert_first(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        plan_id: PlanTier,
        mode: UsageMode,
    ) -> AppResult<UsageCounter> {
        let mut counters = self.counters.lock().unwrap();
        if counters
            .iter()
            .any(|c| c.user_id == user_id && c.usage_date == date)
        {
            return Err(AppError::Conflict("duplicate usage counter".into()));
        }

        let (mini, pro) = match mode {
            UsageMode::GhostMini => (1, 0),
            UsageMode::GhostPro => (0, 1),
        };
        let counter = UsageCounter {
            id: Uuid::new_v4(),
            user_id,
            usage_date: date,
            plan_id,
            ghost_mini_used: mini,
            ghost_pro_used: pro,
        };
        counters.push(counter.clone());

        if self.racing_insert.swap(false, Ordering::SeqCst) {
            // The row exists (the racing winner created it), but this caller
            // observes the uniqueness violation.
            return Err(AppError::Conflict("duplicate usage counter".into()));
        }
        Ok(counter)
    }

    async fn increment(&self, id: Uuid, mode: UsageMode, plan_id: PlanTier) -> AppResult<()> {
        let mut counters = self.counters.lock().unwrap();
        let counter = counters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        match mode {
            UsageMode::GhostMini => counter.ghost_mini_used += 1,
            UsageMode::GhostPro => counter.ghost_pro_used += 1,
        }
        counter.plan_id = plan_id;
        Ok(())
    }
}

// ============================================================================
// InMemoryUsageEventRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUsageEventRepo {
    pub recorded: Mutex<Vec<RecordUsageEvent>>,
    fail: AtomicBool,
}

impl InMemoryUsageEventRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `append` fail, for testing that usage recording is
    /// best-effort.
    pub fn fail_appends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<RecordUsageEvent> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageEventRepo for InMemoryUsageEventRepo {
    async fn append(&self, event: &RecordUsageEvent) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Database("usage event insert failed".into()));
        }
        self.recorded.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// StubAuthProvider
// ============================================================================

/// Maps known access tokens to users; everything else is rejected.
#[derive(Default)]
pub struct StubAuthProvider {
    pub tokens: Mutex<HashMap<String, AuthenticatedUser>>,
}

impl StubAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: &str, user: AuthenticatedUser) {
        self.tokens.lock().unwrap().insert(token.to_string(), user);
    }
}

#[async_trait]
impl AuthProvider for StubAuthProvider {
    async fn verify_token(&self, access_token: &str) -> AppResult<AuthenticatedUser> {
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

// ============================================================================
// StubRewriteEngine
// ============================================================================

pub struct StubRewriteEngine {
    response: String,
    fail_next: AtomicBool,
    calls: AtomicUsize,
}

impl StubRewriteEngine {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail_next: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RewriteEngine for StubRewriteEngine {
    async fn rewrite(&self, _text: &str) -> AppResult<String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::UpstreamFailure("completion API unavailable".into()));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

// ============================================================================
// StubPaymentGateway
// ============================================================================

/// Returns canned checkout sessions and records the parameters it was called
/// with; `fetch_subscription` serves objects registered via
/// `add_subscription`.
#[derive(Default)]
pub struct StubPaymentGateway {
    pub created_sessions: Mutex<Vec<CheckoutParams>>,
    pub subscriptions: Mutex<HashMap<String, GatewaySubscription>>,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subscription(&self, subscription: GatewaySubscription) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription);
    }

    pub fn sessions(&self) -> Vec<CheckoutParams> {
        self.created_sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn create_checkout_session(&self, params: &CheckoutParams) -> AppResult<CheckoutSession> {
        self.created_sessions.lock().unwrap().push(params.clone());
        let token = Uuid::new_v4().simple();
        Ok(CheckoutSession {
            id: format!("cs_test_{}", token),
            url: Some(format!("https://checkout.stripe.test/c/pay/cs_test_{}", token)),
        })
    }

    async fn fetch_subscription(&self, subscription_id: &str) -> AppResult<GatewaySubscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| {
                AppError::UpstreamFailure(format!("no such subscription: {}", subscription_id))
            })
    }
}

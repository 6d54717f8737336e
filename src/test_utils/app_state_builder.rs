//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` wired to in-memory mocks; the
//! returned `TestApp` keeps handles to the mocks for assertions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::auth_provider::AuthenticatedUser,
        use_cases::{
            billing::BillingUseCases, quota::QuotaUseCases, rewrite::RewriteUseCases,
        },
    },
    domain::entities::{order::Order, plan::Plan, subscription::Subscription},
    infra::config::AppConfig,
    test_utils::{
        InMemoryOrderRepo, InMemoryPlanRepo, InMemorySubscriptionRepo, InMemoryUsageCounterRepo,
        InMemoryUsageEventRepo, StubAuthProvider, StubPaymentGateway, StubRewriteEngine,
        default_plans,
    },
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// An `AppState` over in-memory mocks, with the mocks exposed for test
/// assertions.
pub struct TestApp {
    pub state: AppState,
    pub auth: Arc<StubAuthProvider>,
    pub engine: Arc<StubRewriteEngine>,
    pub gateway: Arc<StubPaymentGateway>,
    pub plans: Arc<InMemoryPlanRepo>,
    pub subscriptions: Arc<InMemorySubscriptionRepo>,
    pub orders: Arc<InMemoryOrderRepo>,
    pub counters: Arc<InMemoryUsageCounterRepo>,
    pub events: Arc<InMemoryUsageEventRepo>,
}

pub struct TestAppStateBuilder {
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
    orders: Vec<Order>,
    tokens: Vec<(String, AuthenticatedUser)>,
    rewrite_response: String,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            plans: default_plans(),
            subscriptions: vec![],
            orders: vec![],
            tokens: vec![],
            rewrite_response: "重寫後的文字".to_string(),
        }
    }

    /// Register an access token the stub auth provider will accept.
    pub fn with_token(mut self, token: &str, user: AuthenticatedUser) -> Self {
        self.tokens.push((token.to_string(), user));
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn with_plans(mut self, plans: Vec<Plan>) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_rewrite_response(mut self, response: &str) -> Self {
        self.rewrite_response = response.to_string();
        self
    }

    pub fn build(self) -> TestApp {
        let plans = Arc::new(InMemoryPlanRepo::with_plans(self.plans));
        let subscriptions = Arc::new(InMemorySubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let orders = Arc::new(InMemoryOrderRepo::with_orders(self.orders));
        let counters = Arc::new(InMemoryUsageCounterRepo::new());
        let events = Arc::new(InMemoryUsageEventRepo::new());

        let auth = Arc::new(StubAuthProvider::new());
        for (token, user) in self.tokens {
            auth.add_token(&token, user);
        }
        let engine = Arc::new(StubRewriteEngine::new(&self.rewrite_response));
        let gateway = Arc::new(StubPaymentGateway::new());

        let quota_use_cases = Arc::new(QuotaUseCases::new(
            plans.clone(),
            subscriptions.clone(),
            counters.clone(),
            events.clone(),
        ));
        let rewrite_use_cases = Arc::new(RewriteUseCases::new(
            quota_use_cases.clone(),
            engine.clone(),
        ));
        let billing_use_cases = Arc::new(BillingUseCases::new(
            orders.clone(),
            subscriptions.clone(),
            gateway.clone(),
            Url::parse("https://stealthwriter.test").unwrap(),
        ));

        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            app_url: Url::parse("https://stealthwriter.test").unwrap(),
            auth_base_url: Url::parse("https://auth.stealthwriter.test").unwrap(),
            auth_anon_key: SecretString::new("test_anon_key".into()),
            stripe_secret_key: SecretString::new("sk_test_secret".into()),
            stripe_webhook_secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
            deepseek_api_key: SecretString::new("test_deepseek_key".into()),
            deepseek_base_url: Url::parse("https://api.deepseek.com").unwrap(),
        });

        let state = AppState {
            config,
            auth: auth.clone(),
            quota_use_cases,
            rewrite_use_cases,
            billing_use_cases,
        };

        TestApp {
            state,
            auth,
            engine,
            gateway,
            plans,
            subscriptions,
            orders,
            counters,
            events,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

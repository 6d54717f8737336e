use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::use_cases::{
        billing::{BillingUseCases, OrderRepo, SubscriptionRepo},
        quota::{PlanRepo, QuotaUseCases, UsageCounterRepo, UsageEventRepo},
        rewrite::RewriteUseCases,
    },
    infra::{
        auth_client::SupabaseAuthClient, config::AppConfig, db::init_db,
        deepseek_client::DeepSeekClient, stripe_client::StripeClient,
    },
};
use secrecy::ExposeSecret;
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let pool = init_db(&config.database_url).await?;
    let postgres_arc = Arc::new(PostgresPersistence::new(pool));

    let auth = Arc::new(SupabaseAuthClient::new(
        config.auth_base_url.clone(),
        config.auth_anon_key.expose_secret().to_string(),
    ));
    let stripe = Arc::new(StripeClient::new(
        config.stripe_secret_key.expose_secret().to_string(),
    ));
    let deepseek = Arc::new(DeepSeekClient::new(
        config.deepseek_base_url.clone(),
        config.deepseek_api_key.expose_secret().to_string(),
    ));

    let plan_repo = postgres_arc.clone() as Arc<dyn PlanRepo>;
    let subscription_repo = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;
    let counter_repo = postgres_arc.clone() as Arc<dyn UsageCounterRepo>;
    let event_repo = postgres_arc.clone() as Arc<dyn UsageEventRepo>;
    let order_repo = postgres_arc.clone() as Arc<dyn OrderRepo>;

    let quota_use_cases = Arc::new(QuotaUseCases::new(
        plan_repo,
        subscription_repo.clone(),
        counter_repo,
        event_repo,
    ));

    let rewrite_use_cases = Arc::new(RewriteUseCases::new(quota_use_cases.clone(), deepseek));

    let billing_use_cases = Arc::new(BillingUseCases::new(
        order_repo,
        subscription_repo,
        stripe,
        config.app_url.clone(),
    ));

    Ok(AppState {
        config: Arc::new(config),
        auth,
        quota_use_cases,
        rewrite_use_cases,
        billing_use_cases,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stealthwriter_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}

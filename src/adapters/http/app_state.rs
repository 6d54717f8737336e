use std::sync::Arc;

use crate::{
    application::ports::auth_provider::AuthProvider,
    application::use_cases::{
        billing::BillingUseCases, quota::QuotaUseCases, rewrite::RewriteUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn AuthProvider>,
    pub quota_use_cases: Arc<QuotaUseCases>,
    pub rewrite_use_cases: Arc<RewriteUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
}

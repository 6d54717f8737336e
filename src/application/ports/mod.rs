pub mod auth_provider;
pub mod payment_gateway;
pub mod rewrite_engine;

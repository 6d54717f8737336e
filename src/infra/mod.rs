pub mod app;
pub mod auth_client;
pub mod config;
pub mod db;
pub mod deepseek_client;
pub mod http_client;
pub mod setup;
pub mod stripe_client;

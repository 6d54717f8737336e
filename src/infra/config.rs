use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    /// Public base URL of the web frontend; checkout success/cancel URLs are
    /// derived from it.
    pub app_url: Url,
    pub auth_base_url: Url,
    pub auth_anon_key: SecretString,
    pub stripe_secret_key: SecretString,
    pub stripe_webhook_secret: SecretString,
    pub deepseek_api_key: SecretString,
    pub deepseek_base_url: Url,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let app_url: Url = get_env("APP_URL");
        let auth_base_url: Url = get_env("AUTH_BASE_URL");
        let auth_anon_key: SecretString =
            SecretString::new(get_env::<String>("AUTH_ANON_KEY").into());
        let stripe_secret_key: SecretString =
            SecretString::new(get_env::<String>("STRIPE_SECRET_KEY").into());
        let stripe_webhook_secret: SecretString =
            SecretString::new(get_env::<String>("STRIPE_WEBHOOK_SECRET").into());
        let deepseek_api_key: SecretString =
            SecretString::new(get_env::<String>("DEEPSEEK_API_KEY").into());
        let deepseek_base_url: Url = get_env_default(
            "DEEPSEEK_BASE_URL",
            "https://api.deepseek.com".parse().unwrap(),
        );

        Self {
            bind_addr,
            database_url,
            cors_origin,
            app_url,
            auth_base_url,
            auth_anon_key,
            stripe_secret_key,
            stripe_webhook_secret,
            deepseek_api_key,
            deepseek_base_url,
        }
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::auth_provider::{AuthProvider, AuthenticatedUser},
    infra::http_client::build_client,
};

/// Token verification against a Supabase GoTrue-style auth backend. The
/// provider owns sign-up and session issuance; this client only asks who a
/// bearer token belongs to.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    client: Client,
    base_url: Url,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: Uuid,
    email: Option<String>,
}

impl SupabaseAuthClient {
    pub fn new(base_url: Url, anon_key: String) -> Self {
        Self {
            client: build_client(),
            base_url,
            anon_key,
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn verify_token(&self, access_token: &str) -> AppResult<AuthenticatedUser> {
        let url = format!(
            "{}/auth/v1/user",
            self.base_url.as_str().trim_end_matches('/')
        );
        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Auth request failed: {}", e)))?;

        if !response.status().is_success() {
            // An invalid or expired token, not a provider outage.
            tracing::debug!(status = %response.status(), "Auth provider rejected token");
            return Err(AppError::Unauthenticated);
        }

        let user: AuthUserResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Invalid auth response: {}", e)))?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
        })
    }
}

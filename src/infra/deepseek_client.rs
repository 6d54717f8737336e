use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::rewrite_engine::RewriteEngine,
    infra::http_client::build_client,
};

const MODEL: &str = "deepseek-chat";
const TEMPERATURE: f32 = 0.4;
const MAX_TOKENS: u32 = 800;

const SYSTEM_PROMPT: &str = "You are a seasoned human copy editor from Taiwan. Rewrite the provided Traditional Chinese text so it sounds like it was written by a thoughtful person, with natural rhythm, varied sentence lengths, and specific word choices. Preserve every fact, claim, and instruction, keep the length comparable to the original, and retain any lists or formatting. Remove formulaic or generic phrasing, avoid buzzwords or AI cliches, and never mention AI, rewriting, or that you are an assistant. Respond with the polished text only.";

#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: Option<String>,
}

impl DeepSeekClient {
    pub fn new(base_url: Url, api_key: String) -> Self {
        Self {
            client: build_client(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl RewriteEngine for DeepSeekClient {
    async fn rewrite(&self, text: &str) -> AppResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("請改寫以下內容，讓語氣更像真人撰寫：\n\n{}", text),
                },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("DeepSeek request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChatErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            tracing::error!(status = %status, "DeepSeek API error");
            return Err(AppError::UpstreamFailure(format!(
                "DeepSeek API 錯誤：{}",
                message
            )));
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::UpstreamFailure(format!("Failed to parse DeepSeek response: {}", e))
        })?;

        let rewritten = payload
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        rewritten.ok_or_else(|| {
            AppError::UpstreamFailure("DeepSeek API 未返回有效的改寫結果。".to_string())
        })
    }
}

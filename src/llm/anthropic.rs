// src/llm/anthropic.rs

//! Cloud provider A: Anthropic messages API.

use super::{ChatMessage, Provider};
use crate::config::CONFIG;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Trailing messages sent for context; older turns are summarized into
/// memories instead.
const HISTORY_WINDOW: usize = 5;

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn from_config() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: CONFIG.anthropic_api_key.clone(),
            model: CONFIG.anthropic_model.clone(),
            timeout: Duration::from_secs(CONFIG.anthropic_timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        if !self.available() {
            return Err(ProviderError::Unavailable);
        }

        let window: Vec<_> = messages
            .iter()
            .rev()
            .take(HISTORY_WINDOW)
            .rev()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": CONFIG.max_response_tokens,
                "temperature": 0.8,
                "system": system_prompt,
                "messages": window,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::BadResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let text = body
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::BadResponse("missing content text".into()))?
            .trim()
            .to_string();

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

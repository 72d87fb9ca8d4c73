// src/llm/openai.rs

//! Cloud provider B: OpenAI chat-completions API.

use super::{ChatMessage, ChatRole, Provider};
use crate::config::CONFIG;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const HISTORY_WINDOW: usize = 3;

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn from_config() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: CONFIG.openai_api_key.clone(),
            model: CONFIG.openai_model.clone(),
            timeout: Duration::from_secs(CONFIG.openai_timeout_secs),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
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

        let mut payload = vec![json!({
            "role": ChatRole::System.as_str(),
            "content": system_prompt,
        })];
        payload.extend(
            messages
                .iter()
                .rev()
                .take(HISTORY_WINDOW)
                .rev()
                .map(|m| json!({"role": m.role.as_str(), "content": m.content})),
        );

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": payload,
                "max_tokens": CONFIG.max_response_tokens,
                "temperature": 0.8,
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
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::BadResponse("missing message content".into()))?
            .trim()
            .to_string();

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

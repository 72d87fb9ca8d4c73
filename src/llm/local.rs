// src/llm/local.rs

//! Local model server provider (Ollama-style API). Used twice in the
//! cascade: once as the fast primary and once as the slower fallback model.

use super::{ChatMessage, Provider};
use crate::config::CONFIG;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub struct LocalProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    name: &'static str,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl LocalProvider {
    /// Primary local model: fastest hop in the cascade.
    pub fn primary() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: CONFIG.local_model_url.clone(),
            model: CONFIG.local_model.clone(),
            name: "local",
            timeout: Duration::from_secs(CONFIG.local_timeout_secs),
        }
    }

    /// Fallback local model: tried after the cloud providers.
    pub fn fallback() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: CONFIG.local_model_url.clone(),
            model: CONFIG.local_fallback_model.clone(),
            name: "local-fallback",
            timeout: Duration::from_secs(CONFIG.local_fallback_timeout_secs),
        }
    }

    fn build_prompt(messages: &[ChatMessage], system_prompt: &str) -> String {
        let mut prompt = format!("System: {system_prompt}\n\n");
        for msg in messages {
            let role = msg.role.as_str();
            let mut chars = role.chars();
            let capitalized = match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            };
            prompt.push_str(&format!("{capitalized}: {}\n", msg.content));
        }
        prompt.push_str("Assistant:");
        prompt
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn available(&self) -> bool {
        !self.base_url.is_empty()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        let prompt = Self::build_prompt(messages, system_prompt);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            debug!("{} returned status {}", self.name, response.status());
            return Err(ProviderError::BadResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.response.trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

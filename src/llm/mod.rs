// src/llm/mod.rs

//! Generation backends and the fallback cascade around them.
//!
//! Every backend implements [`Provider`]; the generator walks an ordered
//! list and takes the first non-empty reply, so adding or reordering
//! providers is a data change, not a code change.

pub mod anthropic;
pub mod cache;
pub mod generator;
pub mod local;
pub mod openai;
pub mod rules;

pub use anthropic::AnthropicProvider;
pub use cache::{fingerprint, InMemoryResponseCache, ResponseCache};
pub use generator::{GenerationContext, ResponseGenerator};
pub use local::LocalProvider;
pub use openai::OpenAiProvider;
pub use rules::RuleBasedResponder;

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

/// One entry of the ordered conversation handed to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A generation backend. `attempt` returns `Ok(None)` for a usable-but-empty
/// outcome; errors and timeouts are the cascade's cue to fall through.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap configuration check; unavailable providers are skipped without
    /// burning their timeout.
    fn available(&self) -> bool;

    /// Budget for one attempt. The generator enforces it; an overrun counts
    /// as a miss, not an error.
    fn timeout(&self) -> Duration;

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
    ) -> Result<Option<String>, ProviderError>;
}

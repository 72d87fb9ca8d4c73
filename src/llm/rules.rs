// src/llm/rules.rs

//! Deterministic rule-based responder: the terminal rung of the cascade.
//! Always produces output, so the generator's non-empty contract holds even
//! with every networked provider down.

use super::{ChatMessage, ChatRole, Provider};
use crate::error::ProviderError;
use async_trait::async_trait;
use rand::prelude::IndexedRandom;
use std::time::Duration;

struct Pattern {
    keywords: &'static [&'static str],
    replies: &'static [&'static str],
}

static PATTERNS: &[Pattern] = &[
    Pattern {
        keywords: &["hello", "hi ", "hey", "greetings"],
        replies: &[
            "Hello! I'm really glad you're here. What's on your mind?",
            "Hi there! How can I help you today?",
            "Hey! Great to see you. What would you like to talk about?",
        ],
    },
    Pattern {
        keywords: &["how are you", "how do you do", "how are things"],
        replies: &[
            "I'm doing great, thanks for asking! How about you?",
            "I'm wonderful! Ready to chat about whatever you'd like.",
            "Having a great day! How are you feeling?",
        ],
    },
    Pattern {
        keywords: &["your name", "who are you"],
        replies: &[
            "I'm your companion here to chat with you. What's your name?",
            "Just a friendly companion! What would you like to talk about?",
        ],
    },
    Pattern {
        keywords: &["help", "assist", "support"],
        replies: &[
            "I'm here to chat, listen, and help. Just tell me what's on your mind.",
            "Happy to help! What would you like to talk about?",
        ],
    },
    Pattern {
        keywords: &["thank", "thanks", "appreciate"],
        replies: &[
            "You're very welcome!",
            "My pleasure! Feel free to chat anytime.",
            "You're welcome! I'm here whenever you need me.",
        ],
    },
    Pattern {
        keywords: &["bye", "goodbye", "see you", "farewell"],
        replies: &[
            "Goodbye! It was great chatting with you.",
            "See you later! Take care.",
            "Farewell! Looking forward to our next chat.",
        ],
    },
];

static QUESTION_LEADS: &[&str] = &[
    "That's a great question! Let me think...",
    "Hmm, interesting question! From what I understand...",
    "Good question! Here's what I think...",
];

static DEFAULT_REPLIES: &[&str] = &[
    "That's interesting! Tell me more about that.",
    "I hear what you're saying. How does that make you feel?",
    "Thanks for sharing that with me! What else is on your mind?",
    "I'm listening! Please continue.",
    "That's really something! What do you think about it?",
    "I understand. Is there anything specific you'd like to discuss?",
    "Interesting perspective! What led you to think that way?",
];

pub struct RuleBasedResponder;

impl RuleBasedResponder {
    pub fn new() -> Self {
        Self
    }

    /// Infallible reply selection. Pattern match first, then a question
    /// lead-in, then a generic acknowledgment.
    pub fn reply(&self, messages: &[ChatMessage]) -> String {
        let mut rng = rand::rng();

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.to_lowercase());

        let Some(text) = last_user else {
            return PATTERNS[0].replies.choose(&mut rng).map(|s| s.to_string())
                .unwrap_or_else(|| "Hello! What's on your mind?".to_string());
        };

        for pattern in PATTERNS {
            if pattern.keywords.iter().any(|k| text.contains(k)) {
                if let Some(reply) = pattern.replies.choose(&mut rng) {
                    return reply.to_string();
                }
            }
        }

        if text.contains('?') {
            let lead = QUESTION_LEADS.choose(&mut rng).copied().unwrap_or(QUESTION_LEADS[0]);
            let tail = DEFAULT_REPLIES.choose(&mut rng).copied().unwrap_or(DEFAULT_REPLIES[0]);
            return format!("{lead} {tail}");
        }

        DEFAULT_REPLIES
            .choose(&mut rng)
            .copied()
            .unwrap_or(DEFAULT_REPLIES[0])
            .to_string()
    }
}

impl Default for RuleBasedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for RuleBasedResponder {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn available(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        _system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        Ok(Some(self.reply(messages)))
    }
}

// src/agents/context.rs

//! Intent classification, entity extraction, and personal-information
//! detection. Drives both memory writes (`requires_memory`) and the
//! tier policy (`is_personal_info`).

use super::{Analyzer, AnalyzerInput, AnalyzerKind, AnalyzerPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Question,
    Statement,
    Command,
    Personal,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::Statement => "statement",
            Intent::Command => "command",
            Intent::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub intent: Intent,
    pub entities: Vec<String>,
    pub is_personal_info: bool,
    pub requires_memory: bool,
    pub conversation_depth: usize,
    /// Candidate memory snippets for the aggregate pre-filter. Empty for
    /// this analyzer; replacement strategies may populate it.
    #[serde(default)]
    pub memories: Vec<String>,
}

const QUESTION_WORDS: &[&str] = &["what", "when", "where", "why", "how", "who", "which", "whose"];
const COMMAND_PHRASES: &[&str] = &["please", "can you", "could you", "tell me", "show me", "help me"];
const PERSONAL_WORDS: &[&str] = &["i", "me", "my", "mine", "myself"];
const PERSONAL_PHRASES: &[&str] = &["i am", "my name", "i like", "i love"];
const COPULAS: &[&str] = &["is", "are", "was", "were"];

pub struct ContextAnalyzer;

impl ContextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, input: &AnalyzerInput) -> ContextAnalysis {
        let raw = &input.text;
        let lower = raw.to_lowercase();
        let words: HashSet<&str> = lower.split_whitespace().collect();

        let mut intent_scores: HashMap<Intent, u32> = HashMap::new();

        if lower.contains('?') || QUESTION_WORDS.iter().any(|w| words.contains(w)) {
            intent_scores.insert(Intent::Question, 2);
        }
        if COMMAND_PHRASES.iter().any(|p| lower.contains(p)) {
            intent_scores.insert(Intent::Command, 2);
        }
        if lower.contains('.') || COPULAS.iter().any(|w| words.contains(w)) {
            intent_scores.insert(Intent::Statement, 1);
        }
        if PERSONAL_WORDS.iter().any(|w| words.contains(w)) {
            intent_scores.insert(Intent::Personal, 1);
        }

        // Argmax with a fixed tie order so classification is deterministic
        let intent = [Intent::Question, Intent::Command, Intent::Statement, Intent::Personal]
            .into_iter()
            .filter_map(|i| intent_scores.get(&i).map(|s| (i, *s)))
            .max_by_key(|(_, s)| *s)
            .map(|(i, _)| i)
            .unwrap_or(Intent::Statement);

        let entities = extract_entities(raw);
        let is_personal_info = PERSONAL_WORDS.iter().any(|w| words.contains(w))
            || PERSONAL_PHRASES.iter().any(|p| lower.contains(p));

        ContextAnalysis {
            intent,
            entities,
            is_personal_info,
            requires_memory: is_personal_info || lower.contains("remember"),
            conversation_depth: input.history.len(),
            memories: Vec::new(),
        }
    }
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for ContextAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Context
    }

    async fn process(&self, input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        Ok(AnalyzerPayload::Context(self.analyze(input)))
    }
}

/// Capitalized tokens longer than 2 chars, leading punctuation ignored.
fn extract_entities(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.len() > 2 && w.chars().next().is_some_and(|c| c.is_uppercase()))
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| w.len() > 2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AnalyzerInput;

    fn analyze(text: &str) -> ContextAnalysis {
        ContextAnalyzer::new().analyze(&AnalyzerInput::new(text))
    }

    #[test]
    fn question_wins_over_statement() {
        let result = analyze("what is the capital of France?");
        assert_eq!(result.intent, Intent::Question);
        assert_eq!(result.entities, vec!["France".to_string()]);
    }

    #[test]
    fn personal_info_requires_memory() {
        let result = analyze("my name is Ada and I love chess");
        assert!(result.is_personal_info);
        assert!(result.requires_memory);
    }

    #[test]
    fn remember_keyword_requires_memory() {
        let result = analyze("remember that the meeting moved to Tuesday");
        assert!(result.requires_memory);
        assert!(!result.is_personal_info);
    }

    #[test]
    fn bare_text_defaults_to_statement() {
        assert_eq!(analyze("rain tomorrow maybe").intent, Intent::Statement);
    }
}

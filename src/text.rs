// src/text.rs

//! Shared lightweight text processing: cleaning, stats, stop-word filtering,
//! topic keyword extraction. Everything here is pure and synchronous — the
//! analyzers, scorer and flow tracker all lean on these helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Common English words ignored for keyword overlap and topic extraction.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
        "will", "would", "could", "should", "may", "might", "can", "this", "that", "these",
        "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
        "what", "when", "where", "why", "how", "who",
    ]
    .into_iter()
    .collect()
});

static STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.!?,'-]").expect("strip regex"));

/// Collapse whitespace and strip special characters, keeping basic punctuation.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    STRIP_RE.replace_all(&collapsed, "").trim().to_string()
}

/// Cheap per-turn text features handed to the analyzers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub has_question: bool,
    pub has_exclamation: bool,
    pub capitalized_words: usize,
    pub is_short: bool,
    pub is_long: bool,
}

impl TextStats {
    pub fn analyze(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1);
        Self {
            word_count: words.len(),
            sentence_count,
            has_question: text.contains('?'),
            has_exclamation: text.contains('!'),
            capitalized_words: words
                .iter()
                .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
                .count(),
            is_short: words.len() < 5,
            is_long: words.len() > 50,
        }
    }
}

/// Lowercased tokens with stop words removed. Order preserved, duplicates kept.
pub fn content_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(*w))
        .map(|w| w.to_string())
        .collect()
}

/// Topic keywords: stop-word-filtered tokens longer than 3 chars, first 5.
pub fn topic_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(*w))
        .map(|w| w.to_string())
        .take(5)
        .collect()
}

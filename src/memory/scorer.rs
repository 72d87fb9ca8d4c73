// src/memory/scorer.rs

//! Multi-signal relevance scoring for memory retrieval. Pure and
//! deterministic: identical inputs always produce identical scores and
//! ordering, which the retrieval tests rely on. The caller supplies `now`
//! so recency bucketing is reproducible.

use super::types::{ConversationContext, MemoryRecord, MemoryTier, ScoredMemory};
use crate::text::content_words;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::trace;

const KEYWORD_WEIGHT: f32 = 0.4;
const TAG_WEIGHT: f32 = 0.2;
const TIER_WEIGHT: f32 = 0.2;
const TEMPORAL_WEIGHT: f32 = 0.1;
const CONTEXT_WEIGHT: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct SemanticScorer;

impl SemanticScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores and orders memories by relevance, descending. Ties keep input
    /// order (stable sort).
    pub fn rank(
        &self,
        memories: Vec<MemoryRecord>,
        query: &str,
        context: &ConversationContext,
        now: DateTime<Utc>,
    ) -> Vec<ScoredMemory> {
        let mut scored: Vec<ScoredMemory> = memories
            .into_iter()
            .map(|record| {
                let relevance_score = self.score(&record, query, context, now);
                ScoredMemory {
                    record,
                    relevance_score,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    /// Fixed-weight sum of five independently bounded sub-scores, clamped.
    pub fn score(
        &self,
        memory: &MemoryRecord,
        query: &str,
        context: &ConversationContext,
        now: DateTime<Utc>,
    ) -> f32 {
        let keyword = keyword_overlap(&memory.content, query) * KEYWORD_WEIGHT;
        let tag = tag_relevance(&memory.tags, query) * TAG_WEIGHT;
        let tier = tier_importance(memory.tier) * TIER_WEIGHT;
        let temporal = temporal_relevance(memory.created_at, now) * TEMPORAL_WEIGHT;
        let ctx = context_similarity(memory, context) * CONTEXT_WEIGHT;

        let total = keyword + tag + tier + temporal + ctx;
        trace!(
            "memory {} score: kw={keyword:.3} tag={tag:.3} tier={tier:.3} \
             time={temporal:.3} ctx={ctx:.3} = {total:.3}",
            memory.id
        );
        total.clamp(0.0, 1.0)
    }
}

/// Stop-word-filtered word overlap, ratio boosted x2 and capped at 1.
fn keyword_overlap(content: &str, query: &str) -> f32 {
    if content.is_empty() || query.is_empty() {
        return 0.0;
    }
    let memory_words: HashSet<String> = content_words(content).into_iter().collect();
    let query_words: HashSet<String> = content_words(query).into_iter().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let overlap = memory_words.intersection(&query_words).count();
    ((overlap as f32 / query_words.len() as f32) * 2.0).min(1.0)
}

/// Fraction of tags that match a query term, exactly or as a substring.
fn tag_relevance(tags: &[String], query: &str) -> f32 {
    if tags.is_empty() {
        return 0.0;
    }
    let query_words: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let matches = tags
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|tag| query_words.contains(tag) || query_words.iter().any(|w| w.contains(tag.as_str())))
        .count();
    (matches as f32 / tags.len() as f32).min(1.0)
}

fn tier_importance(tier: MemoryTier) -> f32 {
    match tier {
        MemoryTier::Permanent => 1.0,
        MemoryTier::Personal => 0.9,
        MemoryTier::Temporary => 0.6,
        MemoryTier::SubTemporary => 0.4,
        MemoryTier::Session => 0.2,
    }
}

/// Recency bucketed by age in days.
fn temporal_relevance(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let age_days = now.signed_duration_since(created_at).num_days();
    if age_days < 1 {
        1.0
    } else if age_days < 7 {
        0.8
    } else if age_days < 30 {
        0.6
    } else if age_days < 90 {
        0.4
    } else {
        0.2
    }
}

/// Emotion match with the current turn, else topic-keyword overlap with the
/// tracked topic. Both capped at 0.5 before weighting.
fn context_similarity(memory: &MemoryRecord, context: &ConversationContext) -> f32 {
    if let (Some(memory_emotion), Some(current)) = (memory.emotion_at_creation, context.emotion) {
        if memory_emotion == current {
            return 0.5;
        }
    }

    if let Some(topic) = &context.current_topic {
        let topic_words: HashSet<String> = topic
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if !topic_words.is_empty() {
            let content_words: HashSet<String> = memory
                .content
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            let overlap = topic_words.intersection(&content_words).count();
            if overlap > 0 {
                return (overlap as f32 / topic_words.len() as f32).min(0.5);
            }
        }
    }

    0.0
}

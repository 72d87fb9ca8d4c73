// src/memory/manager.rs

//! Orchestrates tiered storage: classifies and stores new memories, fans out
//! retrieval across the top tiers in parallel, defers ranking to the scorer,
//! and keeps access bookkeeping and expiry purges off the caller's path.

use super::scorer::SemanticScorer;
use super::tiers::TierPolicy;
use super::traits::MemoryStore;
use super::types::{ConversationContext, MemoryRecord, MemoryTier, ScoredMemory};
use crate::agents::Emotion;
use crate::config::CONFIG;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turn-derived context attached to a memory write.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriteContext {
    pub emotion: Option<Emotion>,
    pub is_personal_info: bool,
    pub user_emphasized: bool,
}

/// Importance heuristic for turns stored as memories.
pub fn calculate_importance(content: &str, context: &MemoryWriteContext) -> f32 {
    let mut importance = 0.5_f32;
    let lower = content.to_lowercase();

    const EMPHASIS: &[&str] = &["important", "remember", "never forget", "critical", "essential"];
    if EMPHASIS.iter().any(|k| lower.contains(k)) {
        importance += 0.2;
    }

    if matches!(
        context.emotion,
        Some(Emotion::Joy | Emotion::Sadness | Emotion::Excited)
    ) {
        importance += 0.1;
    }

    if context.user_emphasized {
        importance += 0.15;
    }

    importance.min(1.0)
}

pub struct MemoryManager {
    store: Arc<dyn MemoryStore>,
    scorer: SemanticScorer,
    policy: TierPolicy,
    top_k: usize,
    purge_running: Arc<AtomicBool>,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            scorer: SemanticScorer::new(),
            policy: TierPolicy::from_config(),
            top_k: CONFIG.retrieve_top_k,
            purge_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Classifies the content into a tier, persists it, and opportunistically
    /// kicks off an expired-record purge in the background.
    pub async fn store(
        &self,
        conversation_id: &str,
        content: &str,
        context: &MemoryWriteContext,
        importance: f32,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let tier = self.policy.determine_tier(importance, context.is_personal_info);

        let mut record = MemoryRecord::new(conversation_id, tier, content);
        record.importance = importance.clamp(0.0, 1.0);
        record.emotion_at_creation = context.emotion;
        record.expires_at = self.policy.expiry(tier, now);
        record.tags = extract_tags(content, context.emotion);

        let id = self.store.create_record(&record).await?;
        debug!("stored memory {} in tier {}", id, tier);

        self.spawn_purge();
        Ok(id)
    }

    /// Top-K relevant memories for the query. Tier fetches run in parallel;
    /// access bookkeeping happens after return, off the caller's path. Any
    /// storage fault degrades to an empty result.
    pub async fn retrieve(
        &self,
        conversation_id: &str,
        query: &str,
        context: &ConversationContext,
    ) -> Vec<ScoredMemory> {
        let (permanent, personal, temporary) = tokio::join!(
            self.store.query_by_tier(conversation_id, MemoryTier::Permanent),
            self.store.query_by_tier(conversation_id, MemoryTier::Personal),
            self.store.query_by_tier(conversation_id, MemoryTier::Temporary),
        );

        let now = Utc::now();
        let mut candidates = Vec::new();
        for (tier, result) in [
            (MemoryTier::Permanent, permanent),
            (MemoryTier::Personal, personal),
            (MemoryTier::Temporary, temporary),
        ] {
            match result {
                // Expired records can linger until the next purge; skip them
                Ok(records) => candidates.extend(records.into_iter().filter(|r| !r.is_expired(now))),
                Err(e) => warn!("tier {} fetch failed, degrading: {e}", tier),
            }
        }

        let mut ranked = self.scorer.rank(candidates, query, context, now);
        ranked.truncate(self.top_k);

        // Fire-and-forget: retrieval must not wait on bookkeeping
        let ids: Vec<String> = ranked.iter().map(|m| m.record.id.clone()).collect();
        let store = self.store.clone();
        tokio::spawn(async move {
            for id in ids {
                if let Err(e) = store.update_access(&id, Utc::now()).await {
                    warn!("access update for {} failed: {e}", id);
                }
            }
        });

        ranked
    }

    /// Idempotent background purge; overlapping triggers collapse to one run.
    fn spawn_purge(&self) {
        if self
            .purge_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let store = self.store.clone();
        let flag = self.purge_running.clone();
        tokio::spawn(async move {
            match store.delete_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => debug!("purged {} expired memories", purged),
                Err(e) => warn!("expiry purge failed: {e}"),
            }
            flag.store(false, Ordering::Release);
        });
    }

    /// Direct purge for callers that need to observe the result (tests,
    /// shutdown paths).
    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        Ok(self.store.delete_expired(Utc::now()).await?)
    }
}

/// Tags: words longer than 5 chars (first 5) plus an emotion marker.
fn extract_tags(content: &str, emotion: Option<Emotion>) -> Vec<String> {
    let mut tags: Vec<String> = content
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 5)
        .map(str::to_string)
        .take(5)
        .collect();
    if let Some(e) = emotion {
        tags.push(format!("emotion:{e}"));
    }
    tags
}

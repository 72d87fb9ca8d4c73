// src/memory/types.rs

use crate::agents::Emotion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Retention/priority class of a memory record. A record gets exactly one
/// tier at store time and keeps it; recalculated importance only affects
/// future writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    Session,
    SubTemporary,
    Temporary,
    Personal,
    Permanent,
}

impl MemoryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryTier::Session => "session",
            MemoryTier::SubTemporary => "sub_temporary",
            MemoryTier::Temporary => "temporary",
            MemoryTier::Personal => "personal",
            MemoryTier::Permanent => "permanent",
        }
    }

    /// Tiers that never expire.
    pub fn is_durable(&self) -> bool {
        matches!(self, MemoryTier::Personal | MemoryTier::Permanent)
    }
}

impl std::fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Parse defensively for DB interop; unknown tiers land in Temporary
impl FromStr for MemoryTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "session" => MemoryTier::Session,
            "sub_temporary" => MemoryTier::SubTemporary,
            "personal" => MemoryTier::Personal,
            "permanent" => MemoryTier::Permanent,
            _ => MemoryTier::Temporary,
        })
    }
}

/// Persisted memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub conversation_id: String,
    pub tier: MemoryTier,
    pub content: String,
    pub tags: Vec<String>,
    pub source: String,
    pub importance: f32,
    pub confidence: f32,
    pub emotion_at_creation: Option<Emotion>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    pub fn new(conversation_id: impl Into<String>, tier: MemoryTier, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            tier,
            content: content.into(),
            tags: Vec::new(),
            source: "conversation".to_string(),
            importance: 0.5,
            confidence: 1.0,
            emotion_at_creation: None,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            expires_at: None,
        }
    }

    /// True once `expires_at` has strictly elapsed. Durable tiers never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// A record plus its relevance to one retrieval call. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub record: MemoryRecord,
    pub relevance_score: f32,
}

/// The slice of conversation state the scorer cares about.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    pub emotion: Option<Emotion>,
    pub current_topic: Option<String>,
}

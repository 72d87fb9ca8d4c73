// src/memory/traits.rs

//! Storage contract for memory backends. All persistence goes through this
//! trait; the manager never talks to a database directly.

use super::types::{MemoryRecord, MemoryTier};
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist a record and return its id.
    async fn create_record(&self, record: &MemoryRecord) -> Result<String, StorageError>;

    /// Fetch all live records in one tier for a conversation.
    async fn query_by_tier(
        &self,
        conversation_id: &str,
        tier: MemoryTier,
    ) -> Result<Vec<MemoryRecord>, StorageError>;

    /// Delete records whose expiry has strictly elapsed. Returns the count.
    /// Safe to call concurrently with reads; durable tiers are never touched.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;

    /// Bump access count and refresh `last_accessed`.
    async fn update_access(&self, id: &str, accessed_at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Explicit delete (admin/moderation path).
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

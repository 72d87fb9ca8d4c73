// src/memory/mem.rs

//! In-process memory store. Backs the demo binary and the test suite; the
//! behavior mirrors the SQLite store exactly.

use super::traits::MemoryStore;
use super::types::{MemoryRecord, MemoryTier};
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Test hook: read a record back by id.
    pub fn get(&self, id: &str) -> Option<MemoryRecord> {
        self.records.read().expect("store lock").get(id).cloned()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn create_record(&self, record: &MemoryRecord) -> Result<String, StorageError> {
        self.records
            .write()
            .expect("store lock")
            .insert(record.id.clone(), record.clone());
        Ok(record.id.clone())
    }

    async fn query_by_tier(
        &self,
        conversation_id: &str,
        tier: MemoryTier,
    ) -> Result<Vec<MemoryRecord>, StorageError> {
        let records = self.records.read().expect("store lock");
        let mut found: Vec<MemoryRecord> = records
            .values()
            .filter(|r| r.conversation_id == conversation_id && r.tier == tier)
            .cloned()
            .collect();
        // Newest first, matching the SQLite ordering
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut records = self.records.write().expect("store lock");
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now));
        Ok((before - records.len()) as u64)
    }

    async fn update_access(&self, id: &str, accessed_at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut records = self.records.write().expect("store lock");
        let record = records
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        record.access_count += 1;
        record.last_accessed = accessed_at;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.records
            .write()
            .expect("store lock")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}

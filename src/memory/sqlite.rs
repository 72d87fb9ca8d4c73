// src/memory/sqlite.rs

//! SQLite-backed memory store. Owns the single `memories` table and its
//! migration; everything else goes through the `MemoryStore` trait.

use super::traits::MemoryStore;
use super::types::{MemoryRecord, MemoryTier};
use crate::agents::Emotion;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

pub struct SqliteMemoryStore {
    pool: SqlitePool,
}

impl SqliteMemoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                tier TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT 'conversation',
                importance REAL NOT NULL DEFAULT 0.5,
                confidence REAL NOT NULL DEFAULT 1.0,
                emotion_at_creation TEXT,
                created_at TEXT NOT NULL,
                last_accessed TEXT NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0,
                expires_at TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_memories_conv_tier ON memories (conversation_id, tier)",
        )
        .execute(pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_expires ON memories (expires_at)")
            .execute(pool)
            .await?;
        Ok(())
    }
}

fn row_to_record(row: &SqliteRow) -> Result<MemoryRecord, StorageError> {
    let tags: String = row.try_get("tags")?;
    let emotion: Option<String> = row.try_get("emotion_at_creation")?;
    Ok(MemoryRecord {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        tier: MemoryTier::from_str(row.try_get::<String, _>("tier")?.as_str())
            .unwrap_or(MemoryTier::Temporary),
        content: row.try_get("content")?,
        tags: if tags.is_empty() {
            Vec::new()
        } else {
            tags.split(',').map(str::to_string).collect()
        },
        source: row.try_get("source")?,
        importance: row.try_get("importance")?,
        confidence: row.try_get("confidence")?,
        emotion_at_creation: emotion.and_then(|e| Emotion::from_str(&e).ok()),
        created_at: row.try_get("created_at")?,
        last_accessed: row.try_get("last_accessed")?,
        access_count: row.try_get("access_count")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    async fn create_record(&self, record: &MemoryRecord) -> Result<String, StorageError> {
        sqlx::query(
            r#"
            INSERT INTO memories
                (id, conversation_id, tier, content, tags, source, importance,
                 confidence, emotion_at_creation, created_at, last_accessed,
                 access_count, expires_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.conversation_id)
        .bind(record.tier.as_str())
        .bind(&record.content)
        .bind(record.tags.join(","))
        .bind(&record.source)
        .bind(record.importance)
        .bind(record.confidence)
        .bind(record.emotion_at_creation.map(|e| e.as_str()))
        .bind(record.created_at)
        .bind(record.last_accessed)
        .bind(record.access_count)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(record.id.clone())
    }

    async fn query_by_tier(
        &self,
        conversation_id: &str,
        tier: MemoryTier,
    ) -> Result<Vec<MemoryRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM memories
            WHERE conversation_id = ? AND tier = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(conversation_id)
        .bind(tier.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM memories WHERE expires_at IS NOT NULL AND expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        let purged = result.rows_affected();
        if purged > 0 {
            debug!("purged {} expired memories", purged);
        }
        Ok(purged)
    }

    async fn update_access(&self, id: &str, accessed_at: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE memories SET access_count = access_count + 1, last_accessed = ? WHERE id = ?",
        )
        .bind(accessed_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

// tests/sqlite_store.rs
//
// MemoryStore contract checks against the SQLite backend with an in-memory
// database.

use chrono::{Duration, Utc};
use kindred::agents::Emotion;
use kindred::error::StorageError;
use kindred::memory::{MemoryRecord, MemoryStore, MemoryTier, SqliteMemoryStore};
use sqlx::sqlite::SqlitePoolOptions;

async fn store() -> SqliteMemoryStore {
    // A single connection so every statement sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteMemoryStore::run_migrations(&pool).await.unwrap();
    SqliteMemoryStore::new(pool)
}

#[tokio::test]
async fn round_trips_a_full_record() {
    let store = store().await;

    let mut record = MemoryRecord::new("c1", MemoryTier::Personal, "allergic to peanuts");
    record.tags = vec!["allergic".into(), "peanuts".into(), "emotion:calm".into()];
    record.importance = 0.8;
    record.emotion_at_creation = Some(Emotion::Calm);

    let id = store.create_record(&record).await.unwrap();
    assert_eq!(id, record.id);

    let found = store
        .query_by_tier("c1", MemoryTier::Personal)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let loaded = &found[0];
    assert_eq!(loaded.content, "allergic to peanuts");
    assert_eq!(loaded.tags, record.tags);
    assert_eq!(loaded.emotion_at_creation, Some(Emotion::Calm));
    assert!((loaded.importance - 0.8).abs() < 1e-6);
    assert!(loaded.expires_at.is_none());
}

#[tokio::test]
async fn query_is_scoped_by_conversation_and_tier() {
    let store = store().await;
    store
        .create_record(&MemoryRecord::new("c1", MemoryTier::Permanent, "one"))
        .await
        .unwrap();
    store
        .create_record(&MemoryRecord::new("c1", MemoryTier::Session, "two"))
        .await
        .unwrap();
    store
        .create_record(&MemoryRecord::new("c2", MemoryTier::Permanent, "three"))
        .await
        .unwrap();

    let found = store
        .query_by_tier("c1", MemoryTier::Permanent)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "one");
}

#[tokio::test]
async fn delete_expired_counts_and_spares_durable_rows() {
    let store = store().await;
    let now = Utc::now();

    let mut gone = MemoryRecord::new("c1", MemoryTier::Session, "old");
    gone.expires_at = Some(now - Duration::hours(1));
    store.create_record(&gone).await.unwrap();

    let mut kept = MemoryRecord::new("c1", MemoryTier::Temporary, "new");
    kept.expires_at = Some(now + Duration::days(5));
    store.create_record(&kept).await.unwrap();

    store
        .create_record(&MemoryRecord::new("c1", MemoryTier::Permanent, "forever"))
        .await
        .unwrap();

    let purged = store.delete_expired(now).await.unwrap();
    assert_eq!(purged, 1);
    assert_eq!(
        store.query_by_tier("c1", MemoryTier::Session).await.unwrap().len(),
        0
    );
    assert_eq!(
        store.query_by_tier("c1", MemoryTier::Permanent).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn update_access_bumps_the_counter() {
    let store = store().await;
    let record = MemoryRecord::new("c1", MemoryTier::Temporary, "check me");
    store.create_record(&record).await.unwrap();

    store.update_access(&record.id, Utc::now()).await.unwrap();
    store.update_access(&record.id, Utc::now()).await.unwrap();

    let found = store
        .query_by_tier("c1", MemoryTier::Temporary)
        .await
        .unwrap();
    assert_eq!(found[0].access_count, 2);
}

#[tokio::test]
async fn missing_rows_surface_as_not_found() {
    let store = store().await;
    assert!(matches!(
        store.delete("no-such-id").await,
        Err(StorageError::NotFound(_))
    ));
}

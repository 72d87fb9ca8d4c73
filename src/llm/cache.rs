// src/llm/cache.rs

//! Response cache keyed by a deterministic fingerprint of the last user
//! message, the normalized emotion, and the user id. The user id in the key
//! guarantees one user's hit can never serve another, even on identical text.

use crate::agents::Emotion;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Deterministic cache key.
pub fn fingerprint(last_message: &str, emotion: Emotion, user_id: &str) -> String {
    let normalized = format!(
        "{}:{}:{}",
        last_message.to_lowercase().trim(),
        emotion.as_str(),
        user_id
    );
    format!("response:{:x}", md5::compute(normalized.as_bytes()))
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, fingerprint: &str) -> Option<String>;
    async fn set(&self, fingerprint: &str, reply: &str, ttl: Duration);
    /// Invalidate every entry whose key starts with `prefix`.
    async fn clear(&self, prefix: &str);
}

struct Entry {
    reply: String,
    expires_at: Instant,
}

/// In-process TTL cache shared across all conversations.
#[derive(Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, fingerprint: &str) -> Option<String> {
        let now = Instant::now();
        let entries = self.entries.read().expect("cache lock");
        match entries.get(fingerprint) {
            Some(entry) if entry.expires_at > now => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("cache hit: {}", &fingerprint[..fingerprint.len().min(24)]);
                Some(entry.reply.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn set(&self, fingerprint: &str, reply: &str, ttl: Duration) {
        let mut entries = self.entries.write().expect("cache lock");
        // Piggyback expired-entry cleanup on writes
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            fingerprint.to_string(),
            Entry {
                reply: reply.to_string(),
                expires_at: now + ttl,
            },
        );
    }

    async fn clear(&self, prefix: &str) {
        let mut entries = self.entries.write().expect("cache lock");
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        debug!("cleared {} cached responses", before - entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_and_ttl_expiry() {
        let cache = InMemoryResponseCache::new();
        let fp = fingerprint("hello", Emotion::Neutral, "u1");

        cache.set(&fp, "hello back", Duration::from_secs(60)).await;
        assert_eq!(cache.get(&fp).await.as_deref(), Some("hello back"));

        cache.set(&fp, "hello back", Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&fp).await.is_none());
    }

    #[test]
    fn user_id_isolates_identical_messages() {
        let a = fingerprint("same text", Emotion::Joy, "alice");
        let b = fingerprint("same text", Emotion::Joy, "bob");
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_normalizes_case_and_whitespace() {
        let a = fingerprint("  Hello There ", Emotion::Joy, "u");
        let b = fingerprint("hello there", Emotion::Joy, "u");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn clear_by_prefix() {
        let cache = InMemoryResponseCache::new();
        cache.set("response:aaa", "x", Duration::from_secs(60)).await;
        cache.set("other:bbb", "y", Duration::from_secs(60)).await;
        cache.clear("response:").await;
        assert!(cache.get("response:aaa").await.is_none());
        assert_eq!(cache.get("other:bbb").await.as_deref(), Some("y"));
    }
}

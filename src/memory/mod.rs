// src/memory/mod.rs

//! Tiered conversational memory: typed records, tier/retention policy,
//! semantic relevance scoring, storage backends, and the manager that ties
//! them together.

pub mod manager;
pub mod mem;
pub mod scorer;
pub mod sqlite;
pub mod tiers;
pub mod traits;
pub mod types;

pub use manager::{calculate_importance, MemoryManager, MemoryWriteContext};
pub use mem::InMemoryStore;
pub use scorer::SemanticScorer;
pub use sqlite::SqliteMemoryStore;
pub use tiers::TierPolicy;
pub use traits::MemoryStore;
pub use types::{ConversationContext, MemoryRecord, MemoryTier, ScoredMemory};

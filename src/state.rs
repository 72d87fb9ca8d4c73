// src/state.rs

use crate::{
    agents::AgentCoordinator,
    llm::{InMemoryResponseCache, ResponseGenerator},
    memory::{MemoryManager, MemoryStore},
    pipeline::MessagePipeline,
};
use std::sync::Arc;

/// Process-wide dependency registry, built once at startup. Everything
/// downstream borrows from here; no global mutable singletons.
#[derive(Clone)]
pub struct AppState {
    pub memory_store: Arc<dyn MemoryStore>,
    pub response_cache: Arc<InMemoryResponseCache>,
    pub pipeline: Arc<MessagePipeline>,
}

pub fn create_app_state(memory_store: Arc<dyn MemoryStore>) -> AppState {
    let response_cache = Arc::new(InMemoryResponseCache::new());

    let pipeline = Arc::new(MessagePipeline::new(
        AgentCoordinator::new(),
        MemoryManager::new(memory_store.clone()),
        ResponseGenerator::new(response_cache.clone()),
    ));

    AppState {
        memory_store,
        response_cache,
        pipeline,
    }
}

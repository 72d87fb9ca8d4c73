// tests/pipeline_turns.rs
//
// Full-turn pipeline behavior with the in-process store and the rule-based
// responder as the only provider, so nothing leaves the process.

use kindred::agents::{AgentCoordinator, Emotion};
use kindred::llm::{InMemoryResponseCache, ResponseGenerator, RuleBasedResponder};
use kindred::memory::{InMemoryStore, MemoryManager, MemoryTier};
use kindred::pipeline::MessagePipeline;
use std::sync::Arc;
use std::time::Duration;

fn pipeline() -> (MessagePipeline, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let generator = ResponseGenerator::with_providers(
        vec![Arc::new(RuleBasedResponder::new())],
        Arc::new(InMemoryResponseCache::new()),
        Duration::from_secs(60),
    );
    let pipeline = MessagePipeline::new(
        AgentCoordinator::new(),
        MemoryManager::new(store.clone()),
        generator,
    );
    (pipeline, store)
}

#[tokio::test]
async fn a_turn_always_produces_a_reply() {
    let (pipeline, _) = pipeline();
    let turn = pipeline.process("c1", "u1", "hello there!").await;

    assert!(!turn.reply.is_empty());
    assert!(turn.processing_time > Duration::ZERO);
}

#[tokio::test]
async fn joyful_text_is_classified_as_positive() {
    let (pipeline, _) = pipeline();
    let turn = pipeline
        .process("c1", "u1", "I am SO happy today!!! This is amazing")
        .await;

    assert_eq!(turn.emotion, Emotion::Joy);
    assert!(turn.emotion_confidence > 0.0);
}

#[tokio::test]
async fn personal_statements_are_written_to_memory() {
    let (pipeline, store) = pipeline();
    assert!(store.is_empty());

    pipeline
        .process("c1", "u1", "My name is Marcus and I love astronomy")
        .await;

    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn stored_facts_resurface_on_later_turns() {
    let (pipeline, store) = pipeline();
    pipeline
        .process("c1", "u1", "I love astronomy and telescopes")
        .await;
    assert_eq!(store.len(), 1);

    let turn = pipeline
        .process("c1", "u1", "anything new about astronomy telescopes")
        .await;
    assert!(turn.memories_used >= 1);
}

#[tokio::test]
async fn conversations_do_not_share_memories() {
    let (pipeline, _) = pipeline();
    pipeline
        .process("c1", "u1", "I love astronomy and telescopes")
        .await;

    let other = pipeline
        .process("c2", "u2", "anything new about astronomy telescopes")
        .await;
    assert_eq!(other.memories_used, 0);
}

#[tokio::test]
async fn highly_important_facts_become_durable() {
    let (pipeline, store) = pipeline();
    pipeline
        .process(
            "c1",
            "u1",
            "Please remember this, it's important: I am allergic to peanuts!",
        )
        .await;

    assert_eq!(store.len(), 1);
    let records = store_records(&store).await;
    assert!(records[0].tier.is_durable(), "got tier {:?}", records[0].tier);
}

#[tokio::test]
async fn sessions_are_created_and_ended() {
    let (pipeline, _) = pipeline();
    assert_eq!(pipeline.active_conversations(), 0);

    pipeline.process("c1", "u1", "hi").await;
    pipeline.process("c2", "u2", "hi").await;
    assert_eq!(pipeline.active_conversations(), 2);

    pipeline.end_conversation("c1");
    assert_eq!(pipeline.active_conversations(), 1);
}

#[tokio::test]
async fn empty_input_still_yields_a_friendly_turn() {
    let (pipeline, _) = pipeline();
    let turn = pipeline.process("c1", "u1", "   ").await;
    assert!(!turn.reply.is_empty());
    assert_eq!(turn.emotion, Emotion::Neutral);
}

async fn store_records(store: &InMemoryStore) -> Vec<kindred::memory::MemoryRecord> {
    use kindred::memory::MemoryStore;
    let mut all = Vec::new();
    for tier in [
        MemoryTier::Permanent,
        MemoryTier::Personal,
        MemoryTier::Temporary,
        MemoryTier::SubTemporary,
        MemoryTier::Session,
    ] {
        all.extend(store.query_by_tier("c1", tier).await.unwrap());
    }
    all
}

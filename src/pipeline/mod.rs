// src/pipeline/mod.rs

//! Per-turn orchestration: preprocess, analyze, remember, track flow,
//! respond. One call per incoming message.
//!
//! Contract: `process` always returns a usable turn. Any internal fault is
//! caught at the outer boundary and degraded to a generic friendly reply
//! rather than surfaced to the caller.

use crate::agents::{AgentCoordinator, AnalyzerInput, EmotionAnalysis, Emotion};
use crate::config::CONFIG;
use crate::llm::{ChatMessage, GenerationContext, ResponseGenerator};
use crate::memory::{
    calculate_importance, ConversationContext, MemoryManager, MemoryRecord, MemoryTier,
    MemoryWriteContext, ScoredMemory,
};
use crate::session::{ConversationSession, SessionManager};
use crate::text::{clean_text, TextStats};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What one processed turn produced.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub reply: String,
    pub emotion: Emotion,
    pub emotion_confidence: f32,
    pub memories_used: usize,
    pub processing_time: Duration,
}

pub struct MessagePipeline {
    coordinator: AgentCoordinator,
    memory: MemoryManager,
    generator: ResponseGenerator,
    sessions: SessionManager,
}

impl MessagePipeline {
    pub fn new(
        coordinator: AgentCoordinator,
        memory: MemoryManager,
        generator: ResponseGenerator,
    ) -> Self {
        Self {
            coordinator,
            memory,
            generator,
            sessions: SessionManager::new(),
        }
    }

    /// Runs one full turn. Turns for the same conversation are serialized by
    /// the session lock; different conversations run concurrently.
    pub async fn process(&self, conversation_id: &str, user_id: &str, text: &str) -> TurnResult {
        let started = Instant::now();
        let session = self.sessions.get_or_create(conversation_id, user_id);
        let mut session = session.lock().await;

        match self.run_turn(&mut session, text, started).await {
            Ok(result) => result,
            Err(e) => {
                error!("turn failed for conversation {}: {e:#}", conversation_id);
                TurnResult {
                    reply: "I'm here! Let's chat!".to_string(),
                    emotion: Emotion::Neutral,
                    emotion_confidence: 0.0,
                    memories_used: 0,
                    processing_time: started.elapsed(),
                }
            }
        }
    }

    async fn run_turn(
        &self,
        session: &mut ConversationSession,
        text: &str,
        started: Instant,
    ) -> anyhow::Result<TurnResult> {
        // Stage 1: normalize the text off the async runtime while the
        // history snapshot is taken.
        let raw = text.to_string();
        let clean = tokio::task::spawn_blocking(move || clean_text(&raw));
        let history = session.recent_history(CONFIG.history_limit);
        let cleaned = clean.await?;

        // Stage 2: concurrent analyzers.
        let input = AnalyzerInput {
            stats: TextStats::analyze(&cleaned),
            text: cleaned.clone(),
            history: history.clone(),
            previous_emotion: session.last_emotion,
        };
        let aggregate = self.coordinator.process_parallel(input).await;
        let emotion: EmotionAnalysis = aggregate.emotion().cloned().unwrap_or_default();
        let context = aggregate.context().cloned();
        if !aggregate.success {
            debug!("one or more analyzers degraded this turn");
        }

        // Stage 3: memory. Ranked retrieval first; the analyzers' raw
        // pre-filter snippets stand in when the ranked path comes back empty.
        let flow_context = session.flow.context();
        let conversation_context = ConversationContext {
            emotion: Some(emotion.emotion),
            current_topic: flow_context.current_topic.clone(),
        };
        let mut memories = self
            .memory
            .retrieve(&session.conversation_id, &cleaned, &conversation_context)
            .await;
        if memories.is_empty() && !aggregate.memories.is_empty() {
            memories = aggregate
                .memories
                .iter()
                .take(CONFIG.retrieve_top_k)
                .map(|content| ScoredMemory {
                    record: MemoryRecord::new(
                        &session.conversation_id,
                        MemoryTier::Session,
                        content,
                    ),
                    relevance_score: 0.0,
                })
                .collect();
        }

        if let Some(ctx) = &context {
            if ctx.requires_memory {
                let write_context = MemoryWriteContext {
                    emotion: Some(emotion.emotion),
                    is_personal_info: ctx.is_personal_info,
                    user_emphasized: cleaned.contains('!'),
                };
                let importance = calculate_importance(&cleaned, &write_context);
                if let Err(e) = self
                    .memory
                    .store(&session.conversation_id, &cleaned, &write_context, importance)
                    .await
                {
                    // A failed write must not sink the turn
                    warn!("memory store failed: {e:#}");
                }
            }
        }

        // Stage 4: flow update, after retrieval so this turn's topic shift
        // does not bias its own memory query.
        session
            .flow
            .track(&cleaned, emotion.emotion, context.as_ref().map(|c| c.intent));
        session.last_emotion = Some(emotion.emotion);

        // Stage 5: response.
        let generation_context = GenerationContext {
            user_id: session.user_id.clone(),
            user_name: session.user_name.clone(),
            emotion: emotion.emotion,
            memories: memories.clone(),
            flow: session.flow.context(),
        };
        let mut messages = history;
        messages.push(ChatMessage::user(&cleaned));
        let reply = self.generator.generate(&messages, &generation_context).await;

        session.push_history(ChatMessage::user(&cleaned));
        session.push_history(ChatMessage::assistant(&reply));

        let processing_time = started.elapsed();
        info!(
            "turn done in {:?}: emotion={} confidence={:.2} memories={}",
            processing_time,
            emotion.emotion,
            emotion.confidence,
            memories.len(),
        );

        Ok(TurnResult {
            reply,
            emotion: emotion.emotion,
            emotion_confidence: emotion.confidence,
            memories_used: memories.len(),
            processing_time,
        })
    }

    /// Drops the per-conversation session (flow tracker and history).
    pub fn end_conversation(&self, conversation_id: &str) {
        self.sessions.end(conversation_id);
    }

    pub fn active_conversations(&self) -> usize {
        self.sessions.active_count()
    }
}

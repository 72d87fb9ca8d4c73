// src/agents/mod.rs

//! Analyzer capabilities and the coordinator that runs them concurrently.
//!
//! Each analyzer is a stateless-per-call strategy behind the [`Analyzer`]
//! trait. Payloads are a tagged union per analyzer kind, so a mismatched or
//! missing payload is caught at the coordinator boundary instead of by
//! runtime key-checking.

pub mod context;
pub mod coordinator;
pub mod emotion;
pub mod task;

pub use context::{ContextAnalysis, ContextAnalyzer, Intent};
pub use coordinator::AgentCoordinator;
pub use emotion::{Emotion, EmotionAnalysis, EmotionAnalyzer, IntensityLevel};
pub use task::{TaskAnalysis, TaskAnalyzer, TaskCategory, TaskPriority};

use crate::llm::ChatMessage;
use crate::text::TextStats;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    Emotion,
    Context,
    Task,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Emotion => "emotion",
            AnalyzerKind::Context => "context",
            AnalyzerKind::Task => "task",
        }
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-turn input shared by all analyzers.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerInput {
    pub text: String,
    pub history: Vec<ChatMessage>,
    pub stats: TextStats,
    /// Primary emotion of the previous turn, when the session has one.
    pub previous_emotion: Option<Emotion>,
}

impl AnalyzerInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let stats = TextStats::analyze(&text);
        Self {
            text,
            history: Vec::new(),
            stats,
            previous_emotion: None,
        }
    }
}

/// Tagged union of analyzer outputs, one variant per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalyzerPayload {
    Emotion(EmotionAnalysis),
    Context(ContextAnalysis),
    Task(TaskAnalysis),
}

impl AnalyzerPayload {
    pub fn kind(&self) -> AnalyzerKind {
        match self {
            AnalyzerPayload::Emotion(_) => AnalyzerKind::Emotion,
            AnalyzerPayload::Context(_) => AnalyzerKind::Context,
            AnalyzerPayload::Task(_) => AnalyzerKind::Task,
        }
    }

    /// Candidate memory snippets surfaced by the analyzer, if any. The
    /// coordinator concatenates these into the aggregate as a cheap
    /// pre-filter before the semantic scorer runs.
    pub fn memories(&self) -> &[String] {
        match self {
            AnalyzerPayload::Context(c) => &c.memories,
            _ => &[],
        }
    }
}

/// Outcome of one analyzer for one turn. Immutable once produced.
#[derive(Debug, Clone)]
pub struct AnalyzerResult {
    pub kind: AnalyzerKind,
    pub success: bool,
    pub payload: Option<AnalyzerPayload>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl AnalyzerResult {
    pub fn failed(kind: AnalyzerKind, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            kind,
            success: false,
            payload: None,
            error: Some(error.into()),
            elapsed,
        }
    }
}

/// Merged result of all dispatched analyzers for one turn.
///
/// Invariant: contains an entry for every analyzer that was dispatched, even
/// when it timed out or returned a malformed payload.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    pub results: HashMap<AnalyzerKind, AnalyzerResult>,
    pub memories: Vec<String>,
    pub success: bool,
}

impl AggregatedResult {
    pub fn get(&self, kind: AnalyzerKind) -> Option<&AnalyzerResult> {
        self.results.get(&kind)
    }

    pub fn emotion(&self) -> Option<&EmotionAnalysis> {
        match self.results.get(&AnalyzerKind::Emotion)?.payload.as_ref()? {
            AnalyzerPayload::Emotion(e) => Some(e),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&ContextAnalysis> {
        match self.results.get(&AnalyzerKind::Context)?.payload.as_ref()? {
            AnalyzerPayload::Context(c) => Some(c),
            _ => None,
        }
    }

    pub fn task(&self) -> Option<&TaskAnalysis> {
        match self.results.get(&AnalyzerKind::Task)?.payload.as_ref()? {
            AnalyzerPayload::Task(t) => Some(t),
            _ => None,
        }
    }
}

/// A single analysis capability. Implementations must be cheap to call and
/// must not hold per-conversation state; anything cross-turn lives in the
/// session's flow tracker.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    async fn process(&self, input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload>;
}

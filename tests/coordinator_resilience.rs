// tests/coordinator_resilience.rs
//
// The coordinator must always return one entry per dispatched analyzer,
// whatever happens inside the analyzer: slow, panicking, or mis-shaped
// results degrade that single entry and never cancel siblings.

use async_trait::async_trait;
use kindred::agents::{
    AgentCoordinator, Analyzer, AnalyzerInput, AnalyzerKind, AnalyzerPayload, EmotionAnalyzer,
    Intent, TaskAnalysis, TaskPriority,
};
use std::sync::Arc;
use std::time::Duration;

struct SlowAnalyzer;

#[async_trait]
impl Analyzer for SlowAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Context
    }

    async fn process(&self, _input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        unreachable!("the coordinator should have timed this out")
    }
}

struct PanickingAnalyzer;

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Task
    }

    async fn process(&self, _input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        panic!("analyzer bug");
    }
}

// Claims to be the context analyzer but emits a task payload.
struct MisshapenAnalyzer;

#[async_trait]
impl Analyzer for MisshapenAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Context
    }

    async fn process(&self, _input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        Ok(AnalyzerPayload::Task(TaskAnalysis {
            has_task: false,
            task_types: vec![],
            priority: TaskPriority::Normal,
        }))
    }
}

#[tokio::test]
async fn default_registry_covers_all_three_kinds() {
    let coordinator = AgentCoordinator::new();
    let aggregate = coordinator
        .process_parallel(AnalyzerInput::new("What time is my dentist appointment?"))
        .await;

    assert_eq!(aggregate.results.len(), 3);
    assert!(aggregate.success);
    assert!(aggregate.emotion().is_some());
    assert!(aggregate.task().is_some());
    let context = aggregate.context().unwrap();
    assert_eq!(context.intent, Intent::Question);
}

#[tokio::test]
async fn timed_out_analyzer_degrades_only_its_own_entry() {
    let coordinator = AgentCoordinator::with_analyzers(
        vec![Arc::new(EmotionAnalyzer::new()), Arc::new(SlowAnalyzer)],
        Duration::from_millis(50),
    );
    let aggregate = coordinator
        .process_parallel(AnalyzerInput::new("I am so happy today!"))
        .await;

    assert_eq!(aggregate.results.len(), 2);
    assert!(!aggregate.success);

    let slow = aggregate.get(AnalyzerKind::Context).unwrap();
    assert!(!slow.success);
    assert!(slow.payload.is_none());
    assert!(slow.error.as_deref().unwrap().contains("timed out"));

    let emotion = aggregate.get(AnalyzerKind::Emotion).unwrap();
    assert!(emotion.success);
    assert!(aggregate.emotion().is_some());
}

#[tokio::test]
async fn panicking_analyzer_still_yields_an_entry() {
    let coordinator = AgentCoordinator::with_analyzers(
        vec![Arc::new(EmotionAnalyzer::new()), Arc::new(PanickingAnalyzer)],
        Duration::from_millis(500),
    );
    let aggregate = coordinator
        .process_parallel(AnalyzerInput::new("hello there"))
        .await;

    assert_eq!(aggregate.results.len(), 2);
    assert!(!aggregate.success);
    let task = aggregate.get(AnalyzerKind::Task).unwrap();
    assert!(!task.success);
    assert!(aggregate.emotion().is_some());
}

#[tokio::test]
async fn mismatched_payload_counts_as_failure() {
    let coordinator = AgentCoordinator::with_analyzers(
        vec![Arc::new(MisshapenAnalyzer)],
        Duration::from_millis(500),
    );
    let aggregate = coordinator
        .process_parallel(AnalyzerInput::new("anything"))
        .await;

    assert!(!aggregate.success);
    let entry = aggregate.get(AnalyzerKind::Context).unwrap();
    assert!(!entry.success);
    assert!(aggregate.context().is_none());
}

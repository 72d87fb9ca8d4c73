// src/agents/coordinator.rs

//! Runs every registered analyzer concurrently, each under its own timeout,
//! and merges the outcomes. Partial failure never cancels siblings and never
//! surfaces to the caller.

use super::{
    AggregatedResult, Analyzer, AnalyzerInput, AnalyzerKind, AnalyzerResult, ContextAnalyzer,
    EmotionAnalyzer, TaskAnalyzer,
};
use crate::config::CONFIG;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct AgentCoordinator {
    analyzers: Vec<Arc<dyn Analyzer>>,
    timeout: Duration,
}

impl AgentCoordinator {
    /// Default registry: emotion, context and task analyzers with the
    /// configured per-analyzer timeout.
    pub fn new() -> Self {
        Self::with_analyzers(
            vec![
                Arc::new(EmotionAnalyzer::new()),
                Arc::new(ContextAnalyzer::new()),
                Arc::new(TaskAnalyzer::new()),
            ],
            Duration::from_millis(CONFIG.analyzer_timeout_ms),
        )
    }

    pub fn with_analyzers(analyzers: Vec<Arc<dyn Analyzer>>, timeout: Duration) -> Self {
        Self { analyzers, timeout }
    }

    /// Dispatches one task per analyzer and merges by arrival. The aggregate
    /// always carries one entry per dispatched analyzer; `success` is true
    /// only if every one returned in time with a well-shaped payload.
    pub async fn process_parallel(&self, input: AnalyzerInput) -> AggregatedResult {
        let input = Arc::new(input);
        let timeout = self.timeout;

        let tasks: Vec<_> = self
            .analyzers
            .iter()
            .map(|analyzer| {
                let analyzer = analyzer.clone();
                let input = input.clone();
                let kind = analyzer.kind();
                let handle = tokio::spawn(async move {
                    let start = Instant::now();
                    match tokio::time::timeout(timeout, analyzer.process(&input)).await {
                        Ok(Ok(payload)) => {
                            let elapsed = start.elapsed();
                            if payload.kind() != kind {
                                warn!(
                                    "analyzer {} returned a {} payload, dropping",
                                    kind,
                                    payload.kind()
                                );
                                AnalyzerResult::failed(kind, "payload kind mismatch", elapsed)
                            } else {
                                AnalyzerResult {
                                    kind,
                                    success: true,
                                    payload: Some(payload),
                                    error: None,
                                    elapsed,
                                }
                            }
                        }
                        Ok(Err(e)) => {
                            warn!("analyzer {} failed: {e:#}", kind);
                            AnalyzerResult::failed(kind, e.to_string(), start.elapsed())
                        }
                        // The task is abandoned, not stopped: it may keep
                        // running in the background until its next await.
                        Err(_) => {
                            warn!("analyzer {} timed out after {:?}", kind, timeout);
                            AnalyzerResult::failed(kind, "timed out", timeout)
                        }
                    }
                });
                (kind, handle)
            })
            .collect();

        let mut aggregate = AggregatedResult {
            results: HashMap::with_capacity(tasks.len()),
            memories: Vec::new(),
            success: true,
        };

        let kinds: Vec<AnalyzerKind> = tasks.iter().map(|(k, _)| *k).collect();
        let outcomes = join_all(tasks.into_iter().map(|(_, h)| h)).await;

        for (kind, outcome) in kinds.into_iter().zip(outcomes) {
            let result = match outcome {
                Ok(result) => result,
                // Panicked analyzer task: degraded entry, siblings untouched
                Err(e) => {
                    warn!("analyzer {} task panicked: {e}", kind);
                    AnalyzerResult::failed(kind, format!("task panicked: {e}"), timeout)
                }
            };

            if !result.success {
                aggregate.success = false;
            }
            if let Some(payload) = &result.payload {
                aggregate.memories.extend(payload.memories().iter().cloned());
            }
            aggregate.results.insert(kind, result);
        }

        debug!(
            "aggregate: {} analyzers, success={}, {} pre-filtered memories",
            aggregate.results.len(),
            aggregate.success,
            aggregate.memories.len()
        );

        aggregate
    }
}

impl Default for AgentCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

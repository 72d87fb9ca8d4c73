// src/agents/task.rs

//! Task detection: flags actionable requests (reminders, searches,
//! calculations, information lookups) and their priority.

use super::{Analyzer, AnalyzerInput, AnalyzerKind, AnalyzerPayload};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Reminder,
    Search,
    Calculation,
    Information,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub has_task: bool,
    pub task_types: Vec<TaskCategory>,
    pub priority: TaskPriority,
}

const TASK_KEYWORDS: &[(TaskCategory, &[&str])] = &[
    (TaskCategory::Reminder, &["remind", "remember to", "dont forget", "don't forget"]),
    (TaskCategory::Search, &["search", "find", "look up", "google"]),
    (TaskCategory::Calculation, &["calculate", "compute", "sum", "total"]),
    (TaskCategory::Information, &["what is", "tell me about", "explain"]),
];

const URGENCY_WORDS: &[&str] = &["urgent", "important"];

pub struct TaskAnalyzer;

impl TaskAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, input: &AnalyzerInput) -> TaskAnalysis {
        let lower = input.text.to_lowercase();

        let task_types: Vec<TaskCategory> = TASK_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(category, _)| *category)
            .collect();

        let priority = if URGENCY_WORDS.iter().any(|w| lower.contains(w)) {
            TaskPriority::High
        } else {
            TaskPriority::Normal
        };

        TaskAnalysis {
            has_task: !task_types.is_empty(),
            task_types,
            priority,
        }
    }
}

impl Default for TaskAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for TaskAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Task
    }

    async fn process(&self, input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        Ok(AnalyzerPayload::Task(self.analyze(input)))
    }
}

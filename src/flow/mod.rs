// src/flow/mod.rs

//! Bounded cross-turn memory of topic and emotional trajectory. One tracker
//! per conversation session; pure and synchronous, mutated once per turn.

use crate::agents::{Emotion, Intent};
use crate::config::CONFIG;
use crate::text::topic_keywords;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Shared keywords below this count mean the topic has shifted.
const TOPIC_SHIFT_THRESHOLD: usize = 2;
/// Continuity assigned right after a topic shift.
const SHIFT_CONTINUITY: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTrend {
    Stable,
    Positive,
    Negative,
    Neutral,
}

/// Snapshot handed to the scorer and the response generator.
#[derive(Debug, Clone, Default)]
pub struct FlowContext {
    pub current_topic: Option<String>,
    pub topic_continuity: f32,
    pub recent_emotions: Vec<Emotion>,
    pub emotion_trend: EmotionTrend,
    pub conversation_length: usize,
    pub needs_topic_continuation: bool,
}

impl Default for EmotionTrend {
    fn default() -> Self {
        EmotionTrend::Stable
    }
}

/// Suggested response shaping derived from the flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTone {
    Friendly,
    Enthusiastic,
    Supportive,
}

pub struct FlowTracker {
    max_history: usize,
    topic_history: VecDeque<Vec<String>>,
    emotion_history: VecDeque<Emotion>,
    intent_history: VecDeque<Intent>,
    current_topic: Option<String>,
    topic_continuity: f32,
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::with_capacity(CONFIG.flow_max_history)
    }

    pub fn with_capacity(max_history: usize) -> Self {
        Self {
            max_history,
            topic_history: VecDeque::with_capacity(max_history),
            emotion_history: VecDeque::with_capacity(max_history),
            intent_history: VecDeque::with_capacity(max_history),
            current_topic: None,
            topic_continuity: 0.0,
        }
    }

    /// Folds one turn into the tracked state.
    pub fn track(&mut self, text: &str, emotion: Emotion, intent: Option<Intent>) {
        let keywords = topic_keywords(text);

        if !keywords.is_empty() {
            match &self.current_topic {
                Some(topic) => {
                    let topic_words: HashSet<&str> = topic.split_whitespace().collect();
                    let overlap = keywords
                        .iter()
                        .filter(|k| topic_words.contains(k.as_str()))
                        .count();
                    if overlap < TOPIC_SHIFT_THRESHOLD {
                        self.topic_continuity = SHIFT_CONTINUITY;
                        self.current_topic = Some(keywords[..keywords.len().min(3)].join(" "));
                    } else {
                        self.topic_continuity = (overlap as f32 / keywords.len() as f32).min(1.0);
                    }
                }
                None => {
                    self.current_topic = Some(keywords[..keywords.len().min(3)].join(" "));
                    self.topic_continuity = 1.0;
                }
            }
        }

        push_bounded(&mut self.topic_history, keywords, self.max_history);
        push_bounded(&mut self.emotion_history, emotion, self.max_history);
        if let Some(intent) = intent {
            push_bounded(&mut self.intent_history, intent, self.max_history);
        }
    }

    pub fn context(&self) -> FlowContext {
        let recent_emotions: Vec<Emotion> = self
            .emotion_history
            .iter()
            .rev()
            .take(3)
            .rev()
            .copied()
            .collect();
        let emotion_trend = emotion_trend(&recent_emotions);

        FlowContext {
            current_topic: self.current_topic.clone(),
            topic_continuity: self.topic_continuity,
            recent_emotions,
            emotion_trend,
            conversation_length: self.topic_history.len(),
            needs_topic_continuation: self.topic_continuity > 0.5 && self.current_topic.is_some(),
        }
    }

    /// Tone/length shaping for the generator's prompt.
    pub fn suggested_tone(&self) -> ResponseTone {
        match self.context().emotion_trend {
            EmotionTrend::Positive => ResponseTone::Enthusiastic,
            EmotionTrend::Negative => ResponseTone::Supportive,
            _ => ResponseTone::Friendly,
        }
    }

    /// Resets with the session.
    pub fn reset(&mut self) {
        self.topic_history.clear();
        self.emotion_history.clear();
        self.intent_history.clear();
        self.current_topic = None;
        self.topic_continuity = 0.0;
    }
}

impl Default for FlowTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded<T>(buf: &mut VecDeque<T>, value: T, cap: usize) {
    if buf.len() == cap {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// Trend over the last 3 emotions: stable if all identical, positive/negative
/// if either of the last two leans that way, else neutral.
fn emotion_trend(emotions: &[Emotion]) -> EmotionTrend {
    if emotions.is_empty() {
        return EmotionTrend::Stable;
    }
    let first = emotions[0];
    if emotions.iter().all(|e| *e == first) {
        return EmotionTrend::Stable;
    }
    let last_two = &emotions[emotions.len().saturating_sub(2)..];
    if last_two
        .iter()
        .any(|e| e.is_positive() || *e == Emotion::Friendly)
    {
        EmotionTrend::Positive
    } else if last_two
        .iter()
        .any(|e| e.is_negative() || *e == Emotion::Fear)
    {
        EmotionTrend::Negative
    } else {
        EmotionTrend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_shift_resets_continuity_and_switches_topic() {
        let mut tracker = FlowTracker::with_capacity(10);
        tracker.track("did you see the football scores last night", Emotion::Joy, None);
        let before = tracker.context();
        assert!(before.topic_continuity > 0.5);
        assert!(before.current_topic.as_deref().unwrap_or("").contains("football"));

        tracker.track("what's the weather looking like", Emotion::Neutral, None);
        let after = tracker.context();
        assert!(after.topic_continuity < 0.5);
        assert!(after.current_topic.as_deref().unwrap_or("").contains("weather"));
        assert!(!after.needs_topic_continuation);
    }

    #[test]
    fn sustained_topic_keeps_continuity() {
        let mut tracker = FlowTracker::with_capacity(10);
        tracker.track("planning the garden beds this spring", Emotion::Calm, None);
        tracker.track("garden beds need planning before spring rain", Emotion::Calm, None);
        let ctx = tracker.context();
        assert!(ctx.topic_continuity >= 0.5);
        assert!(ctx.needs_topic_continuation);
    }

    #[test]
    fn emotion_trend_over_last_three() {
        let mut tracker = FlowTracker::with_capacity(10);
        for _ in 0..3 {
            tracker.track("same old same old today", Emotion::Calm, None);
        }
        assert_eq!(tracker.context().emotion_trend, EmotionTrend::Stable);

        tracker.track("actually this is amazing news", Emotion::Joy, None);
        assert_eq!(tracker.context().emotion_trend, EmotionTrend::Positive);
    }

    #[test]
    fn tone_follows_the_trend() {
        let mut tracker = FlowTracker::with_capacity(10);
        assert_eq!(tracker.suggested_tone(), ResponseTone::Friendly);

        tracker.track("rough start to the week", Emotion::Calm, None);
        tracker.track("things got worse at work", Emotion::Sadness, None);
        tracker.track("now everything is falling apart", Emotion::Sadness, None);
        assert_eq!(tracker.suggested_tone(), ResponseTone::Supportive);
    }

    #[test]
    fn history_is_bounded() {
        let mut tracker = FlowTracker::with_capacity(3);
        for i in 0..10 {
            tracker.track(&format!("message number {i} about things"), Emotion::Neutral, None);
        }
        assert_eq!(tracker.context().conversation_length, 3);
    }
}

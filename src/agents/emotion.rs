// src/agents/emotion.rs

//! Multi-signal emotion detection: keyword lexicons with proximity-window
//! intensifier/negator adjustment, punctuation/caps intensity, a small
//! sentiment-polarity lexicon blended in, and a transition boost from the
//! previous turn's emotion.

use super::{Analyzer, AnalyzerInput, AnalyzerKind, AnalyzerPayload};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Window (chars) within which an intensifier amplifies a matched keyword.
const INTENSIFIER_WINDOW: usize = 20;
/// Window (chars) within which a negator suppresses a matched keyword.
const NEGATOR_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Excited,
    Calm,
    Friendly,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Excited => "excited",
            Emotion::Calm => "calm",
            Emotion::Friendly => "friendly",
            Emotion::Neutral => "neutral",
        }
    }

    /// Emotions that pull the conversation trend positive.
    pub fn is_positive(&self) -> bool {
        matches!(self, Emotion::Joy | Emotion::Excited)
    }

    /// Emotions that pull the conversation trend negative.
    pub fn is_negative(&self) -> bool {
        matches!(self, Emotion::Sadness | Emotion::Anger)
    }

    /// Natural follow-on emotions, used to bias detection toward plausible
    /// transitions from the previous turn.
    fn transitions(&self) -> &'static [Emotion] {
        match self {
            Emotion::Joy => &[Emotion::Excited, Emotion::Joy, Emotion::Friendly],
            Emotion::Sadness => &[Emotion::Calm, Emotion::Neutral],
            Emotion::Anger => &[Emotion::Calm, Emotion::Neutral],
            Emotion::Fear => &[Emotion::Calm, Emotion::Friendly],
            Emotion::Excited => &[Emotion::Joy],
            Emotion::Neutral => &[Emotion::Friendly, Emotion::Calm],
            _ => &[],
        }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Neutral
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "joy" | "happy" => Emotion::Joy,
            "sadness" | "sad" => Emotion::Sadness,
            "anger" | "angry" => Emotion::Anger,
            "fear" | "scared" => Emotion::Fear,
            "excited" => Emotion::Excited,
            "calm" => Emotion::Calm,
            "friendly" => Emotion::Friendly,
            _ => Emotion::Neutral,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    Neutral,
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub emotion: Emotion,
    pub confidence: f32,
    pub all_emotions: HashMap<Emotion, f32>,
    pub sentiment: f32,
    /// Intensity read from text features alone (punctuation, caps, repeats).
    pub intensity: IntensityLevel,
    /// Overall intensity, folding in score magnitude and confidence.
    pub intensity_level: IntensityLevel,
}

impl Default for EmotionAnalysis {
    fn default() -> Self {
        Self {
            emotion: Emotion::Neutral,
            confidence: 0.5,
            all_emotions: HashMap::new(),
            sentiment: 0.0,
            intensity: IntensityLevel::Low,
            intensity_level: IntensityLevel::Neutral,
        }
    }
}

struct EmotionPattern {
    emotion: Emotion,
    keywords: &'static [&'static str],
    intensifiers: &'static [&'static str],
}

const NEGATORS: &[&str] = &["not", "never", "no"];

static PATTERNS: &[EmotionPattern] = &[
    EmotionPattern {
        emotion: Emotion::Joy,
        keywords: &[
            "happy", "joy", "excited", "great", "wonderful", "amazing", "love", "perfect",
            "fantastic", "awesome", "delighted", "thrilled", "ecstatic",
        ],
        intensifiers: &["so", "very", "really", "extremely", "incredibly"],
    },
    EmotionPattern {
        emotion: Emotion::Sadness,
        keywords: &[
            "sad", "depressed", "unhappy", "terrible", "awful", "crying", "miserable", "down",
            "upset", "disappointed", "hurt",
        ],
        intensifiers: &["so", "very", "really", "extremely"],
    },
    EmotionPattern {
        emotion: Emotion::Anger,
        keywords: &[
            "angry", "furious", "mad", "annoyed", "frustrated", "hate", "rage", "irritated",
        ],
        intensifiers: &["so", "very", "really", "extremely", "absolutely"],
    },
    EmotionPattern {
        emotion: Emotion::Fear,
        keywords: &[
            "scared", "afraid", "worried", "anxious", "nervous", "terrified", "frightened",
            "panic",
        ],
        intensifiers: &["so", "very", "really", "extremely"],
    },
    EmotionPattern {
        emotion: Emotion::Excited,
        keywords: &[
            "excited", "thrilled", "pumped", "energized", "wow", "yay", "awesome", "amazing",
        ],
        intensifiers: &["so", "very", "really", "extremely", "super"],
    },
    EmotionPattern {
        emotion: Emotion::Calm,
        keywords: &["calm", "peaceful", "relaxed", "serene", "chill", "cool", "fine", "okay"],
        intensifiers: &["so", "very", "really", "quite"],
    },
    EmotionPattern {
        emotion: Emotion::Friendly,
        keywords: &["friendly", "nice", "kind", "warm", "welcoming", "pleasant", "good"],
        intensifiers: &["so", "very", "really", "quite"],
    },
];

// The `regex` crate has no backreferences, so `([a-z])\1{2,}` is expanded
// into an equivalent alternation: any lowercase letter repeated 3+ times.
static REPEATED_LETTERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"a{3,}|b{3,}|c{3,}|d{3,}|e{3,}|f{3,}|g{3,}|h{3,}|i{3,}|j{3,}|k{3,}|l{3,}|m{3,}|n{3,}|o{3,}|p{3,}|q{3,}|r{3,}|s{3,}|t{3,}|u{3,}|v{3,}|w{3,}|x{3,}|y{3,}|z{3,}",
    )
    .expect("repeat regex")
});

pub struct EmotionAnalyzer;

impl EmotionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, input: &AnalyzerInput) -> EmotionAnalysis {
        let text = &input.text;
        let lower = text.to_lowercase();
        let words: std::collections::HashSet<&str> = lower.split_whitespace().collect();

        let mut scores: HashMap<Emotion, f32> = HashMap::new();

        for pattern in PATTERNS {
            let mut score = 0.0_f32;
            let mut multiplier = 1.0_f32;

            let keyword_matches = pattern
                .keywords
                .iter()
                .filter(|k| words.contains(**k))
                .count();
            if keyword_matches > 0 {
                score += keyword_matches as f32 * 0.3;
            }

            // Intensifier within the window of any matched keyword amplifies
            for intensifier in pattern.intensifiers {
                if let Some(ipos) = lower.find(intensifier) {
                    let near = pattern.keywords.iter().any(|k| {
                        lower
                            .find(k)
                            .is_some_and(|kpos| ipos.abs_diff(kpos) < INTENSIFIER_WINDOW)
                    });
                    if near {
                        multiplier = multiplier.max(1.5);
                        score += 0.2;
                        break;
                    }
                }
            }

            // Negator within the (tighter) window suppresses
            for negator in NEGATORS {
                if let Some(npos) = lower.find(negator) {
                    let near = pattern.keywords.iter().any(|k| {
                        lower
                            .find(k)
                            .is_some_and(|kpos| npos.abs_diff(kpos) < NEGATOR_WINDOW)
                    });
                    if near {
                        score *= 0.3;
                        break;
                    }
                }
            }

            if score > 0.0 {
                scores.insert(pattern.emotion, score * multiplier);
            }
        }

        // Blend in sentiment polarity rather than letting it override keywords
        let polarity = sentiment_polarity(&lower);
        if polarity > 0.4 {
            *scores.entry(Emotion::Joy).or_insert(0.0) += polarity * 0.5;
        } else if polarity > 0.1 {
            *scores.entry(Emotion::Friendly).or_insert(0.0) += polarity * 0.3;
        } else if polarity < -0.4 {
            *scores.entry(Emotion::Sadness).or_insert(0.0) += polarity.abs() * 0.5;
        } else if polarity < -0.1 {
            *scores.entry(Emotion::Anger).or_insert(0.0) += polarity.abs() * 0.3;
        }

        let intensity = detect_intensity(text);
        let intensity_factor = match intensity {
            IntensityLevel::VeryHigh => 1.5,
            IntensityLevel::High => 1.2,
            _ => 1.0,
        };
        if intensity_factor > 1.0 {
            for score in scores.values_mut() {
                *score *= intensity_factor;
            }
        }

        // Bias toward plausible transitions from the previous turn
        if let Some(prev) = input.previous_emotion {
            for follow in prev.transitions() {
                if let Some(score) = scores.get_mut(follow) {
                    *score *= 1.1;
                }
            }
        }

        let (emotion, confidence) = if scores.is_empty() {
            if polarity > 0.2 {
                (Emotion::Friendly, 0.6)
            } else if polarity < -0.2 {
                (Emotion::Sadness, 0.6)
            } else {
                (Emotion::Neutral, 0.5)
            }
        } else {
            // Deterministic argmax: ties break toward the lexicon ordering
            let top = PATTERNS
                .iter()
                .map(|p| p.emotion)
                .filter_map(|e| scores.get(&e).map(|s| (e, *s)))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(e, _)| e)
                .unwrap_or(Emotion::Neutral);
            let top_score = scores.get(&top).copied().unwrap_or(0.0);
            let total: f32 = scores.values().sum();
            // Multiplicative boosts can push top past the running total, so
            // clamp instead of trusting the ratio to stay bounded.
            (top, (top_score / total.max(1.0)).clamp(0.0, 1.0))
        };

        let intensity_level = intensity_level(&scores, intensity, confidence);

        EmotionAnalysis {
            emotion,
            confidence,
            all_emotions: scores,
            sentiment: polarity,
            intensity,
            intensity_level,
        }
    }
}

impl Default for EmotionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for EmotionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Emotion
    }

    async fn process(&self, input: &AnalyzerInput) -> anyhow::Result<AnalyzerPayload> {
        Ok(AnalyzerPayload::Emotion(self.analyze(input)))
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "happy", "love", "wonderful", "amazing", "awesome", "fantastic", "perfect",
    "nice", "excellent", "beautiful", "fun", "glad", "best",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "sad", "hate", "horrible", "angry", "worst", "ugly", "annoying",
    "miserable", "upset", "wrong", "broken", "hurt",
];

/// Tiny polarity lexicon with token-window negation. Returns [-1, 1];
/// 0.0 when no sentiment-bearing word is present.
pub fn sentiment_polarity(lower: &str) -> f32 {
    let tokens: Vec<&str> = lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();

    let mut sum = 0.0_f32;
    let mut matched = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        let base = if POSITIVE_WORDS.contains(token) {
            1.0
        } else if NEGATIVE_WORDS.contains(token) {
            -1.0
        } else {
            continue;
        };
        // A negator within the two preceding tokens flips polarity
        let negated = tokens[i.saturating_sub(2)..i]
            .iter()
            .any(|t| NEGATORS.contains(t));
        sum += if negated { -base } else { base };
        matched += 1;
    }

    if matched == 0 {
        0.0
    } else {
        (sum / matched as f32).clamp(-1.0, 1.0)
    }
}

fn detect_intensity(text: &str) -> IntensityLevel {
    let mut intensity = IntensityLevel::Low;

    let exclamations = text.matches('!').count();
    if exclamations >= 3 {
        intensity = IntensityLevel::VeryHigh;
    } else if exclamations >= 2 {
        intensity = IntensityLevel::High;
    } else if exclamations >= 1 {
        intensity = IntensityLevel::Medium;
    }

    let has_letters = text.chars().any(|c| c.is_alphabetic());
    if has_letters && text.len() > 3 && text.to_uppercase() == text {
        intensity = intensity.max(IntensityLevel::High);
    }

    if REPEATED_LETTERS.is_match(&text.to_lowercase()) {
        intensity = intensity.max(IntensityLevel::High);
    }

    if text.matches('?').count() >= 2 {
        intensity = intensity.max(IntensityLevel::Medium);
    }

    intensity
}

fn intensity_level(
    scores: &HashMap<Emotion, f32>,
    intensity: IntensityLevel,
    confidence: f32,
) -> IntensityLevel {
    if scores.is_empty() {
        return IntensityLevel::Neutral;
    }
    let max_score = scores.values().cloned().fold(0.0_f32, f32::max);

    if intensity == IntensityLevel::VeryHigh || (max_score > 2.0 && confidence > 0.8) {
        IntensityLevel::VeryHigh
    } else if intensity == IntensityLevel::High || (max_score > 1.0 && confidence > 0.7) {
        IntensityLevel::High
    } else if max_score > 0.5 && confidence > 0.6 {
        IntensityLevel::Medium
    } else {
        IntensityLevel::Low
    }
}

//! Scored passage records.

use serde::{Deserialize, Serialize};

/// Explanation used when the model gave none.
pub const MISSING_EXPLANATION: &str = "analysis not available";

/// Scores at or inside ±this value are neutral.
pub const NEUTRAL_THRESHOLD: f64 = 0.25;

/// Score for one passage. `original_text` is re-attached locally, never
/// taken from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub original_text: String,
    /// Polarity and strength, -1.0 ..= 1.0
    pub score: f64,
    /// Intensity regardless of polarity, 0.0 ..= 1.0
    pub magnitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl AnalysisResult {
    /// The record used when the model returned nothing for a passage.
    pub fn unavailable(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            score: 0.0,
            magnitude: 0.0,
            explanation: Some(MISSING_EXPLANATION.into()),
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_score(self.score)
    }

    /// Explanation text for display.
    pub fn explanation_or_placeholder(&self) -> &str {
        self.explanation.as_deref().unwrap_or(MISSING_EXPLANATION)
    }
}

/// Display bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn from_score(score: f64) -> Self {
        if score > NEUTRAL_THRESHOLD {
            Self::Positive
        } else if score < -NEUTRAL_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

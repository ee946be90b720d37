//! Chart data derived from a completed run.

use crate::types::{AnalysisResult, Sentiment};
use serde::{Deserialize, Serialize};

/// Characters of passage text kept in a scatter label.
pub const LABEL_CHARS: usize = 30;

/// Passage count per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }

    /// Buckets in display order.
    pub fn buckets(&self) -> [(Sentiment, usize); 3] {
        [
            (Sentiment::Negative, self.negative),
            (Sentiment::Neutral, self.neutral),
            (Sentiment::Positive, self.positive),
        ]
    }
}

/// One point of the score/magnitude plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Position of the passage in the run
    pub id: usize,
    pub score: f64,
    pub magnitude: f64,
    pub label: String,
}

pub fn distribution(results: &[AnalysisResult]) -> Distribution {
    results
        .iter()
        .fold(Distribution::default(), |mut acc, r| {
            match r.sentiment() {
                Sentiment::Negative => acc.negative += 1,
                Sentiment::Neutral => acc.neutral += 1,
                Sentiment::Positive => acc.positive += 1,
            }
            acc
        })
}

pub fn scatter(results: &[AnalysisResult]) -> Vec<ScatterPoint> {
    results
        .iter()
        .enumerate()
        .map(|(id, r)| ScatterPoint {
            id,
            score: round2(r.score),
            magnitude: round2(r.magnitude),
            label: label(&r.original_text),
        })
        .collect()
}

/// First [`LABEL_CHARS`] characters followed by `...`.
pub fn label(text: &str) -> String {
    let mut label: String = text.chars().take(LABEL_CHARS).collect();
    label.push_str("...");
    label
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

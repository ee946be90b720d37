//! Batch sentiment scoring.
//!
//! All passages of a file go to the model in one request. The reply is a JSON
//! array that is matched back onto the passages purely by position: entry `i`
//! scores passage `i`. Missing entries and missing fields fall back to
//! [`AnalysisResult::unavailable`] values; a reply that is not an array of
//! objects fails the whole batch.

use crate::provider::{GenerateRequest, Provider, ProviderError};
use crate::types::{AnalysisResult, MISSING_EXPLANATION};
use senti_common::config::LlmConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Separator placed between indexed passages in the prompt.
pub const PASSAGE_DELIMITER: &str = "\n---\n";

/// Analysis failure. The whole batch fails; there is no partial result.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("missing credential: configure a Gemini API key")]
    MissingCredential,

    #[error("analysis request failed")]
    Request(#[source] ProviderError),

    #[error("the model returned an empty response")]
    EmptyResponse,

    #[error("the model returned a malformed response")]
    MalformedResponse(#[source] serde_json::Error),
}

/// One array entry as the model returns it. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
struct RawScore {
    score: Option<f64>,
    magnitude: Option<f64>,
    explanation: Option<String>,
}

/// Scores passages through a [`Provider`].
#[derive(Clone)]
pub struct SentimentAnalyzer {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: Option<f64>,
    explanation_language: String,
}

impl SentimentAnalyzer {
    pub fn new(provider: Arc<dyn Provider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            explanation_language: config.explanation_language.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Score every passage. The result has the same length and order as
    /// `passages`.
    pub async fn analyze(&self, passages: &[String]) -> Result<Vec<AnalysisResult>, AnalysisError> {
        if !self.provider.has_credentials() {
            tracing::warn!(provider = self.provider.name(), "No credential configured");
            return Err(AnalysisError::MissingCredential);
        }
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(passages, &self.explanation_language),
            temperature: self.temperature,
            max_tokens: None,
            response_schema: Some(response_schema()),
        };

        tracing::info!(
            provider = self.provider.name(),
            model = %self.model,
            passages = passages.len(),
            "Sending analysis batch"
        );

        let response = self.provider.generate(request).await.map_err(|e| {
            tracing::error!(error = %e, "Analysis request failed");
            AnalysisError::Request(e)
        })?;

        let results = merge_scores(passages, &response.content)?;
        tracing::info!(
            results = results.len(),
            latency_ms = response.latency_ms,
            total_tokens = response.usage.total_tokens,
            "Analysis batch completed"
        );
        Ok(results)
    }
}

/// Prompt listing every passage as `ID:{i} | TEXT: "{text}"`.
pub fn build_prompt(passages: &[String], explanation_language: &str) -> String {
    let input = passages
        .iter()
        .enumerate()
        .map(|(index, text)| format!("ID:{index} | TEXT: \"{text}\""))
        .collect::<Vec<_>>()
        .join(PASSAGE_DELIMITER);

    format!(
        "You are an expert sentiment analyst. Analyze the following passages (separated by '---').\n\
         For each passage, return values precise to the hundredth (two decimal places).\n\
         \n\
         Required output:\n\
         1. 'score': a precise number between -1.00 (negative) and 1.00 (positive). 0 is neutral. \
         Examples: 0.43, -0.12, 0.89. Do NOT round to tenths (do not use only 0.4 or 0.5).\n\
         2. 'magnitude': a precise number between 0.00 (no emotion) and 1.00 (strong emotion). \
         Examples: 0.55, 0.91.\n\
         3. 'explanation': a short explanation in {explanation_language} (max 10 words).\n\
         \n\
         Return exactly one object per passage and strictly keep the order of the output array \
         identical to the order of the input.\n\
         \n\
         INPUT DATA:\n\
         {input}\n"
    )
}

/// Structured output schema: an array of `{score, magnitude, explanation?}`.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "score": {
                    "type": "NUMBER",
                    "description": "Sentiment score from -1.00 to 1.00 (e.g. 0.45, -0.12)."
                },
                "magnitude": {
                    "type": "NUMBER",
                    "description": "Sentiment magnitude from 0.00 to 1.00 (e.g. 0.85, 0.12)."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A very brief explanation (max 10 words) of why this score was assigned."
                }
            },
            "required": ["score", "magnitude"]
        }
    })
}

/// Parse the model's JSON text and zip it onto `passages` by position.
pub fn merge_scores(passages: &[String], content: &str) -> Result<Vec<AnalysisResult>, AnalysisError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let entries: Vec<Option<RawScore>> = serde_json::from_str(content).map_err(|e| {
        tracing::error!(error = %e, "Unparseable model response");
        AnalysisError::MalformedResponse(e)
    })?;

    if entries.len() != passages.len() {
        tracing::warn!(
            expected = passages.len(),
            received = entries.len(),
            "Model returned a different number of entries; matching by position"
        );
    }

    let mut entries = entries.into_iter();
    let results: Vec<AnalysisResult> = passages
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let raw = entries.next().flatten().unwrap_or_default();
            to_result(index, text, raw)
        })
        .collect();

    debug_assert_eq!(results.len(), passages.len());
    Ok(results)
}

fn to_result(index: usize, text: &str, raw: RawScore) -> AnalysisResult {
    let score = raw.score.unwrap_or(0.0);
    let magnitude = raw.magnitude.unwrap_or(0.0);
    let clamped_score = score.clamp(-1.0, 1.0);
    let clamped_magnitude = magnitude.clamp(0.0, 1.0);

    if clamped_score != score || clamped_magnitude != magnitude {
        tracing::warn!(index, score, magnitude, "Out-of-range values clamped");
    }

    AnalysisResult {
        original_text: text.to_string(),
        score: clamped_score,
        magnitude: clamped_magnitude,
        explanation: Some(
            raw.explanation
                .unwrap_or_else(|| MISSING_EXPLANATION.to_string()),
        ),
    }
}

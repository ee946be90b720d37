//! Model provider abstraction.
//!
//! The analyzer talks to the remote model only through [`Provider`], so the
//! Gemini client can be swapped for a stub in tests.

mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Provider Trait
// ============================================================================

/// A hosted model that turns one prompt into one text response.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Whether a credential is available. Checked before any request.
    fn has_credentials(&self) -> bool;

    /// Send a single generation request.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError>;
}

/// Error from a provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl ProviderError {
    pub fn new(provider: &str, model: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.model, self.message)
    }
}

impl std::error::Error for ProviderError {}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A single-prompt generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model to use
    pub model: String,
    /// The full prompt text
    pub prompt: String,
    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// JSON schema the response must conform to; implies a JSON response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// Provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub provider: String,
    pub model: String,
    /// Response text (JSON text when a schema was requested)
    pub content: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
    /// Response latency in milliseconds
    pub latency_ms: u64,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("gemini", "gemini-2.5-flash", "boom").with_status(503);
        assert_eq!(err.to_string(), "[gemini:gemini-2.5-flash] boom");
        assert_eq!(err.status_code, Some(503));
    }

    #[test]
    fn test_generate_request_serialization() {
        let request = GenerateRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "Hello".into(),
            temperature: None,
            max_tokens: Some(1000),
            response_schema: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gemini-2.5-flash"));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("response_schema"));
    }
}

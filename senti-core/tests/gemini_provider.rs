//! Gemini provider against a local stand-in for the REST endpoint.

use senti_common::config::LlmConfig;
use senti_core::provider::{GeminiProvider, GenerateRequest, Provider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    let config = LlmConfig {
        base_url: format!("{}/v1beta", server.uri()),
        timeout_secs: 5,
        ..Default::default()
    };
    GeminiProvider::from_config(&config, Some("test-key"))
}

fn request() -> GenerateRequest {
    GenerateRequest {
        model: "gemini-2.5-flash".into(),
        prompt: "score these".into(),
        temperature: Some(0.2),
        max_tokens: None,
        response_schema: Some(json!({ "type": "ARRAY" })),
    }
}

#[tokio::test]
async fn sends_schema_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "score these" }] }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[{\"score\":" }, { "text": "0.5,\"magnitude\":0.4}]" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server).generate(request()).await.unwrap();
    assert_eq!(response.content, r#"[{"score":0.5,"magnitude":0.4}]"#);
    assert_eq!(response.provider, "gemini");
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(response.usage.total_tokens, 20);
}

#[tokio::test]
async fn http_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = provider(&server).generate(request()).await.unwrap_err();
    assert_eq!(err.status_code, Some(503));
    assert!(err.message.contains("overloaded"));
    assert!(!err.to_string().contains("test-key"));
}

#[tokio::test]
async fn error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "message": "API key not valid" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).generate(request()).await.unwrap_err();
    assert!(err.message.contains("API key not valid"));
    assert_eq!(err.status_code, None);
}

#[tokio::test]
async fn no_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = provider(&server).generate(request()).await.unwrap_err();
    assert_eq!(err.message, "No response from Gemini");
}

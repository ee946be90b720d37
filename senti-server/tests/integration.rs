//! Integration tests for senti-server.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use senti_common::config::LlmConfig;
use senti_core::{AnalysisSession, GeminiProvider, SentimentAnalyzer};
use senti_server::{build_router, ServiceState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAX_UPLOAD: usize = 1024;

async fn gemini_returning(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .mount(&server)
        .await;
    server
}

fn test_app(server: &MockServer, api_key: Option<&str>) -> axum::Router {
    let config = LlmConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..Default::default()
    };
    let provider = Arc::new(GeminiProvider::from_config(&config, api_key));
    let session = AnalysisSession::new(SentimentAnalyzer::new(provider, &config));
    build_router(ServiceState::new(session, api_key.is_some(), MAX_UPLOAD))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = gemini_returning("[]").await;
    let response = test_app(&server, None).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["credentials_configured"], false);
}

#[tokio::test]
async fn test_full_analysis_flow() {
    let server = gemini_returning(
        r#"[{"score":0.8,"magnitude":0.9,"explanation":"positive tone"},{"score":-0.7,"magnitude":0.6,"explanation":"complaint"}]"#,
    )
    .await;
    let app = test_app(&server, Some("key"));

    // 1. Initial state
    let json = json_body(app.clone().oneshot(get("/api/state")).await.unwrap()).await;
    assert_eq!(json["data"]["status"], "idle");
    assert_eq!(json["data"]["progress"], 0);

    // 2. Upload
    let response = app
        .clone()
        .oneshot(post(
            "/api/analyze?file_name=reviews.txt",
            "Great product!\n\nTerrible \"service\".",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["progress"], 100);
    assert_eq!(json["data"]["fileName"], "reviews.txt");
    assert_eq!(json["data"]["results"][1]["originalText"], "Terrible \"service\".");

    // 3. Charts
    let json = json_body(app.clone().oneshot(get("/api/charts")).await.unwrap()).await;
    assert_eq!(
        json["data"]["distribution"],
        json!({ "negative": 1, "neutral": 0, "positive": 1 })
    );
    assert_eq!(json["data"]["scatter"][0]["label"], "Great product!...");

    // 4. Export
    let response = app.clone().oneshot(get("/api/export.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"sentiment_analysis_results.csv\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "Text,Score,Magnitude,Explanation\n\
         \"Great product!\",0.80,0.90,\"positive tone\"\n\
         \"Terrible \"\"service\"\".\",-0.70,0.60,\"complaint\""
    );

    // 5. A second upload needs a reset first
    let response = app
        .clone()
        .oneshot(post("/api/analyze?file_name=more.txt", "again"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_STATE");

    // 6. Reset
    let response = app.clone().oneshot(post("/api/reset", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "idle");
    assert_eq!(json["data"]["results"], json!([]));
}

#[tokio::test]
async fn test_failed_run_reports_error_state() {
    let server = gemini_returning("[]").await;
    let app = test_app(&server, None);

    let response = app
        .clone()
        .oneshot(post("/api/analyze?file_name=reviews.txt", "Great product!"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["data"]["status"], "error");
    assert!(json["data"]["error"]
        .as_str()
        .unwrap()
        .starts_with("missing credential"));

    let response = app.clone().oneshot(get("/api/export.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["code"], "NOT_COMPLETED");
}

#[tokio::test]
async fn test_rejects_unsupported_extension() {
    let server = gemini_returning("[]").await;
    let app = test_app(&server, Some("key"));

    let response = app
        .clone()
        .oneshot(post("/api/analyze?file_name=notes.pdf", "text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "UNSUPPORTED_FILE");

    // Nothing was started
    let json = json_body(app.oneshot(get("/api/state")).await.unwrap()).await;
    assert_eq!(json["data"]["status"], "idle");
}

#[tokio::test]
async fn test_requires_file_name() {
    let server = gemini_returning("[]").await;
    let response = test_app(&server, Some("key"))
        .oneshot(post("/api/analyze", "text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_upload_size_limit() {
    let server = gemini_returning("[]").await;
    let response = test_app(&server, Some("key"))
        .oneshot(post(
            "/api/analyze?file_name=big.txt",
            "x".repeat(MAX_UPLOAD + 1),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_charts_require_completed_run() {
    let server = gemini_returning("[]").await;
    let response = test_app(&server, Some("key"))
        .oneshot(get("/api/charts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "NOT_COMPLETED");
    assert_eq!(
        json["error"]["message"],
        "No completed analysis (current state: idle)"
    );
}

//! HTTP API routes.

use crate::error::ServerError;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use senti_common::config::Config;
use senti_core::state::{AppState, StateView};
use senti_core::{charts, export, parser};
use senti_core::{AnalysisSession, GeminiProvider, SentimentAnalyzer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Shared service state.
#[derive(Clone)]
pub struct ServiceState {
    pub session: AnalysisSession,
    pub credentials_configured: bool,
    pub max_upload_bytes: usize,
}

impl ServiceState {
    pub fn new(session: AnalysisSession, credentials_configured: bool, max_upload_bytes: usize) -> Self {
        Self {
            session,
            credentials_configured,
            max_upload_bytes,
        }
    }

    /// Wire a Gemini-backed session from configuration.
    pub fn from_config(config: &Config) -> Self {
        let api_key = config.gemini_api_key();
        let provider = Arc::new(GeminiProvider::from_config(&config.llm, api_key));
        let analyzer = SentimentAnalyzer::new(provider, &config.llm);

        Self::new(
            AnalysisSession::new(analyzer),
            api_key.is_some(),
            config.server.max_upload_bytes,
        )
    }
}

/// Build the application router.
pub fn build_router(state: ServiceState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Pipeline
        .route("/api/state", get(get_state))
        .route("/api/analyze", post(analyze))
        .route("/api/reset", post(reset))
        // Results
        .route("/api/charts", get(get_charts))
        .route("/api/export.csv", get(export_csv))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": data
    }))
}

// ============ Health Check ============

async fn health_check(State(state): State<ServiceState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "senti-server",
        "version": env!("CARGO_PKG_VERSION"),
        "credentials_configured": state.credentials_configured
    }))
}

// ============ Pipeline ============

async fn get_state(State(state): State<ServiceState>) -> impl IntoResponse {
    success(state.session.snapshot().await.view())
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    file_name: Option<String>,
}

async fn analyze(
    State(state): State<ServiceState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let file_name = params
        .file_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("file_name query parameter is required".into()))?;

    if !parser::is_supported_file_name(&file_name) {
        return Err(ServerError::UnsupportedFile { file_name });
    }

    tracing::info!(file_name = %file_name, bytes = body.len(), "Upload received");

    let outcome = state.session.submit(&file_name, &body).await?;
    let view = StateView::from(&outcome);

    let status = match outcome {
        AppState::Completed { .. } => StatusCode::OK,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok((
        status,
        Json(serde_json::json!({
            "success": status == StatusCode::OK,
            "data": view
        })),
    ))
}

async fn reset(State(state): State<ServiceState>) -> Result<impl IntoResponse, ServerError> {
    let idle = state.session.reset().await?;
    Ok(success(idle.view()))
}

// ============ Results ============

#[derive(Debug, Serialize)]
struct ChartsResponse {
    distribution: charts::Distribution,
    scatter: Vec<charts::ScatterPoint>,
}

async fn completed_state(state: &ServiceState) -> Result<AppState, ServerError> {
    let snapshot = state.session.snapshot().await;
    match snapshot {
        AppState::Completed { .. } => Ok(snapshot),
        other => Err(ServerError::NotCompleted {
            status: other.status(),
        }),
    }
}

async fn get_charts(State(state): State<ServiceState>) -> Result<impl IntoResponse, ServerError> {
    let completed = completed_state(&state).await?;
    let results = completed.results();

    Ok(success(ChartsResponse {
        distribution: charts::distribution(results),
        scatter: charts::scatter(results),
    }))
}

async fn export_csv(State(state): State<ServiceState>) -> Result<impl IntoResponse, ServerError> {
    let completed = completed_state(&state).await?;
    let csv = export::to_csv(completed.results());

    Ok((
        [
            (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::DEFAULT_FILE_NAME),
            ),
        ],
        csv,
    ))
}

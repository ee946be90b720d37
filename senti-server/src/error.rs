//! Error types for senti-server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use senti_core::state::{Status, TransitionError};
use serde::Serialize;

/// Request-level failures. A run that ends in the `Error` state is not one of
/// these; it is reported with the state itself.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported file type: {file_name} (accepted: .xlsx, .xls, .csv, .txt)")]
    UnsupportedFile { file_name: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("No completed analysis (current state: {status})")]
    NotCompleted { status: Status },
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::UnsupportedFile { .. } => (StatusCode::BAD_REQUEST, "UNSUPPORTED_FILE"),
            ServerError::Transition(TransitionError::Busy { .. }) => (StatusCode::CONFLICT, "BUSY"),
            ServerError::Transition(TransitionError::Invalid { .. }) => {
                (StatusCode::CONFLICT, "INVALID_STATE")
            }
            ServerError::NotCompleted { .. } => (StatusCode::CONFLICT, "NOT_COMPLETED"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: code.to_string(),
                message: self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

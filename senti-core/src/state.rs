//! Application state machine.
//!
//! [`AppState`] is replaced wholesale on every transition. [`AppState::apply`]
//! is pure; the async driver lives in [`crate::session`].

use crate::types::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Where the current file is in the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AppState {
    #[default]
    Idle,
    Parsing {
        file_name: String,
    },
    Analyzing {
        file_name: String,
        passage_count: usize,
    },
    Completed {
        file_name: String,
        results: Vec<AnalysisResult>,
    },
    Error {
        file_name: Option<String>,
        message: String,
    },
}

/// Status tag of an [`AppState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Parsing,
    Analyzing,
    Completed,
    Error,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`AppState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FileSupplied { file_name: String },
    ParseSucceeded { passage_count: usize },
    ParseFailed { message: String },
    AnalysisSucceeded { results: Vec<AnalysisResult> },
    AnalysisFailed { message: String },
    Reset,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Self::FileSupplied { .. } => "file_supplied",
            Self::ParseSucceeded { .. } => "parse_succeeded",
            Self::ParseFailed { .. } => "parse_failed",
            Self::AnalysisSucceeded { .. } => "analysis_succeeded",
            Self::AnalysisFailed { .. } => "analysis_failed",
            Self::Reset => "reset",
        }
    }
}

/// A refused transition. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a file is already being processed ({status})")]
    Busy { status: Status },

    #[error("event '{event}' is not valid in state '{status}'")]
    Invalid { status: Status, event: &'static str },
}

impl AppState {
    pub fn status(&self) -> Status {
        match self {
            Self::Idle => Status::Idle,
            Self::Parsing { .. } => Status::Parsing,
            Self::Analyzing { .. } => Status::Analyzing,
            Self::Completed { .. } => Status::Completed,
            Self::Error { .. } => Status::Error,
        }
    }

    /// 100 once results are available, 0 otherwise.
    pub fn progress(&self) -> u8 {
        match self {
            Self::Completed { .. } => 100,
            _ => 0,
        }
    }

    /// Results of a completed run; empty in every other state.
    pub fn results(&self) -> &[AnalysisResult] {
        match self {
            Self::Completed { results, .. } => results,
            _ => &[],
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Parsing { file_name }
            | Self::Analyzing { file_name, .. }
            | Self::Completed { file_name, .. } => Some(file_name),
            Self::Error { file_name, .. } => file_name.as_deref(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// A run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Parsing { .. } | Self::Analyzing { .. })
    }

    /// Compute the next state.
    pub fn apply(&self, event: Event) -> Result<AppState, TransitionError> {
        let next = match (self, event) {
            (Self::Idle, Event::FileSupplied { file_name }) => Self::Parsing { file_name },

            (Self::Parsing { file_name }, Event::ParseSucceeded { passage_count }) => {
                Self::Analyzing {
                    file_name: file_name.clone(),
                    passage_count,
                }
            }
            (Self::Parsing { file_name }, Event::ParseFailed { message }) => Self::Error {
                file_name: Some(file_name.clone()),
                message,
            },

            (Self::Analyzing { file_name, .. }, Event::AnalysisSucceeded { results }) => {
                Self::Completed {
                    file_name: file_name.clone(),
                    results,
                }
            }
            (Self::Analyzing { file_name, .. }, Event::AnalysisFailed { message }) => {
                Self::Error {
                    file_name: Some(file_name.clone()),
                    message,
                }
            }

            (Self::Idle | Self::Completed { .. } | Self::Error { .. }, Event::Reset) => Self::Idle,

            (state, event) if state.is_busy() => {
                tracing::debug!(status = %state.status(), event = event.name(), "Refused while busy");
                return Err(TransitionError::Busy {
                    status: state.status(),
                });
            }
            (state, event) => {
                return Err(TransitionError::Invalid {
                    status: state.status(),
                    event: event.name(),
                });
            }
        };
        Ok(next)
    }

    pub fn view(&self) -> StateView {
        StateView::from(self)
    }
}

/// Flat rendering of [`AppState`] used by the HTTP and `--json` outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub status: Status,
    pub results: Vec<AnalysisResult>,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub progress: u8,
}

impl From<&AppState> for StateView {
    fn from(state: &AppState) -> Self {
        Self {
            status: state.status(),
            results: state.results().to_vec(),
            file_name: state.file_name().map(String::from),
            error: state.error().map(String::from),
            progress: state.progress(),
        }
    }
}

//! Async driver for the state machine.
//!
//! One [`AnalysisSession`] processes one file at a time. The record sits
//! behind a [`RwLock`] that is only held while a transition is applied, so
//! readers see `Parsing` and `Analyzing` while a run is in flight.
//!
//! Each run executes on its own task. A caller that stops waiting (client
//! disconnect, timeout) does not stop the run, so the session always reaches
//! `Completed` or `Error` and can be reset.

use crate::analysis::SentimentAnalyzer;
use crate::parser;
use crate::state::{AppState, Event, TransitionError};
use senti_common::logging::generate_run_id;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Instrument;

/// Error message recorded when a run's task dies before finishing.
pub const RUN_ABORTED: &str = "analysis run aborted";

/// Shared pipeline state plus the analyzer that drives it.
#[derive(Clone)]
pub struct AnalysisSession {
    state: Arc<RwLock<AppState>>,
    analyzer: SentimentAnalyzer,
}

impl AnalysisSession {
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::Idle)),
            analyzer,
        }
    }

    /// Current state.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Return to `Idle`. Refused while a run is in flight.
    pub async fn reset(&self) -> Result<AppState, TransitionError> {
        self.transition(Event::Reset).await
    }

    /// Run one file through parse and analysis.
    ///
    /// Only a refused `FileSupplied` is an `Err`; parse and analysis failures
    /// end in [`AppState::Error`] and are returned as `Ok`.
    pub async fn submit(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<AppState, TransitionError> {
        self.transition(Event::FileSupplied {
            file_name: file_name.to_string(),
        })
        .await?;

        let span = tracing::info_span!("analysis_run", run_id = %generate_run_id(), file_name);
        let session = self.clone();
        let file_name = file_name.to_string();
        let bytes = bytes.to_vec();
        let run = tokio::spawn(
            async move { session.run(&file_name, &bytes).await }.instrument(span),
        );

        match run.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Analysis task ended abnormally");
                self.abort_in_flight().await
            }
        }
    }

    async fn run(&self, file_name: &str, bytes: &[u8]) -> Result<AppState, TransitionError> {
        tracing::info!(bytes = bytes.len(), "Run started");

        let passages = match parser::parse_content(file_name, bytes) {
            Ok(passages) => passages,
            Err(e) => {
                tracing::warn!(error = %e, details = ?e, "Parse failed");
                return self
                    .transition(Event::ParseFailed {
                        message: e.to_string(),
                    })
                    .await;
            }
        };

        self.transition(Event::ParseSucceeded {
            passage_count: passages.len(),
        })
        .await?;

        let event = match self.analyzer.analyze(&passages).await {
            Ok(results) => Event::AnalysisSucceeded { results },
            Err(e) => {
                tracing::warn!(error = %e, details = ?e, "Analysis failed");
                Event::AnalysisFailed {
                    message: e.to_string(),
                }
            }
        };

        let state = self.transition(event).await?;
        tracing::info!(status = %state.status(), results = state.results().len(), "Run finished");
        Ok(state)
    }

    /// Move a run whose task died into `Error`.
    async fn abort_in_flight(&self) -> Result<AppState, TransitionError> {
        let mut guard = self.state.write().await;
        let event = match &*guard {
            AppState::Parsing { .. } => Event::ParseFailed {
                message: RUN_ABORTED.into(),
            },
            AppState::Analyzing { .. } => Event::AnalysisFailed {
                message: RUN_ABORTED.into(),
            },
            settled => return Ok(settled.clone()),
        };
        let next = guard.apply(event)?;
        *guard = next.clone();
        Ok(next)
    }

    async fn transition(&self, event: Event) -> Result<AppState, TransitionError> {
        let mut guard = self.state.write().await;
        let next = guard.apply(event)?;
        tracing::debug!(from = %guard.status(), to = %next.status(), "State transition");
        *guard = next.clone();
        Ok(next)
    }
}

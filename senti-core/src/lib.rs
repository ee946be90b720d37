//! senti-core - passage parsing, Gemini sentiment scoring and the analysis
//! state machine.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod charts;
pub mod export;
pub mod parser;
pub mod provider;
pub mod session;
pub mod state;
pub mod types;

pub use analysis::{AnalysisError, SentimentAnalyzer};
pub use charts::{Distribution, ScatterPoint};
pub use parser::{parse_content, parse_file, ParseError};
pub use provider::{GeminiProvider, Provider, ProviderError};
pub use session::AnalysisSession;
pub use state::{AppState, Event, StateView, Status, TransitionError};
pub use types::{AnalysisResult, Sentiment};

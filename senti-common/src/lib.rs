//! Senti Common - configuration, validation and logging shared by the Senti tools.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod validation;

pub use config::{Config, LlmConfig, NetworkConfig, ObservabilityConfig, SecretsConfig, ServerConfig};
pub use validation::{Validate, ValidationError, ValidationResult};

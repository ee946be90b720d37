//! Configuration management for the Senti tools.
//!
//! Both `senti` and `senti-server` read a single configuration file at
//! `~/.senti/config.json`. A missing file means defaults.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SENTI_BIND_ADDRESS` → network.bind
//! - `SENTI_PORT` → server.port
//! - `SENTI_LOG_LEVEL` → observability.log_level
//! - `SENTI_LOG_FORMAT` → observability.log_format
//! - `SENTI_MODEL` → llm.model
//! - `SENTI_LLM_BASE_URL` → llm.base_url
//! - `GEMINI_API_KEY`, `GOOGLE_API_KEY`, `API_KEY` → secrets.gemini_api_key (first set wins)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables searched, in order, for the Gemini credential.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

const REDACTED: &str = "***";

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".senti"),
        |dirs| dirs.home_dir().join(".senti"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network / Server
// ============================================================================

/// Bind address for the HTTP service. Default is `127.0.0.1` (local only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_port() -> u16 {
    4480
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

// ============================================================================
// LLM
// ============================================================================

/// Remote model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Gemini model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL, up to and including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Sampling temperature; the provider default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Language the model writes its short explanations in
    #[serde(default = "default_explanation_language")]
    pub explanation_language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            temperature: None,
            explanation_language: default_explanation_language(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_explanation_language() -> String {
    "English".into()
}

// ============================================================================
// Secrets / Observability
// ============================================================================

/// Credentials. Never logged; see [`Config::redacted`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets pinned to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration shared by every Senti binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path. `~` is expanded.
    pub fn load_from(path: &Path) -> Result<Self> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let content = fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config from {expanded}"))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {expanded}"))
    }

    /// Load from `path` (or the default location) and apply environment overrides.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup.
    ///
    /// Runs before logging is set up, so bad values are errors, not warnings.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("SENTI_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Some(port) = lookup("SENTI_PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid SENTI_PORT value '{port}'"))?;
        }
        if let Some(level) = lookup("SENTI_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("SENTI_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(model) = lookup("SENTI_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("SENTI_LLM_BASE_URL") {
            self.llm.base_url = url;
        }

        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(|key| !key.trim().is_empty())
        {
            self.secrets.gemini_api_key = Some(key);
        }

        Ok(())
    }

    /// The Gemini credential, if a non-empty one is configured.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.secrets
            .gemini_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Socket address string for the HTTP service.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.network.bind, self.server.port)
    }

    /// Copy of this configuration with credentials masked, safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.secrets.gemini_api_key.is_some() {
            copy.secrets.gemini_api_key = Some(REDACTED.into());
        }
        copy
    }
}

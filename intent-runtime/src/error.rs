//! Error types for intent-runtime

use std::time::Duration;
use thiserror::Error;

/// Result type alias for intent operations
pub type Result<T> = std::result::Result<T, IntentError>;

#[derive(Error, Debug)]
pub enum IntentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Strategy timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments for tool {tool}: {reason}")]
    InvalidPayload { tool: String, reason: String },
}

impl IntentError {
    pub fn invalid_payload(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        IntentError::InvalidPayload {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for IntentError {
    fn from(err: config::ConfigError) -> Self {
        IntentError::Config(err.to_string())
    }
}

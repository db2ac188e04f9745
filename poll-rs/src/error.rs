//! Error types for poll-rs

use thiserror::Error;

/// Result type alias for poll operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Poll core error types
///
/// Reducers and caches never produce these for "not applicable" conditions;
/// they surface from configuration loading and from the search boundary.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Search failed: {0}")]
    Search(String),
}

impl From<regex::Error> for PollError {
    fn from(err: regex::Error) -> Self {
        PollError::InvalidPattern(err.to_string())
    }
}

impl From<config::ConfigError> for PollError {
    fn from(err: config::ConfigError) -> Self {
        PollError::Config(err.to_string())
    }
}

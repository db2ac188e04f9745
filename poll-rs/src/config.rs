//! Configuration for poll-rs

use crate::error::{PollError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment prefix for overrides (e.g. `POLL__SEARCH__MIN_QUERY_LENGTH=3`)
pub const ENV_PREFIX: &str = "POLL";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchSettings,
    pub logging: LoggingConfig,
}

/// Conversation search and cache tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Non-empty queries shorter than this return an empty result
    pub min_query_length: usize,
    pub case_sensitive: bool,
    /// Maximum number of cached search results
    pub cache_max_size: usize,
    /// Result lifetime in seconds
    pub cache_ttl_secs: u64,
    /// Maximum number of compiled highlight patterns kept around
    pub regex_cache_size: usize,
    /// Period of the background cleanup task in seconds
    pub cleanup_interval_secs: u64,
}

impl SearchSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            case_sensitive: false,
            cache_max_size: 100,
            cache_ttl_secs: 5 * 60,
            regex_cache_size: 50,
            cleanup_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// One of "pretty", "compact" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PollError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| PollError::Config(e.to_string()))
    }

    /// Layer an optional config file and `POLL__*` environment variables over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.cache_max_size == 0 {
            return Err(PollError::Config(
                "search.cache_max_size must be greater than zero".to_string(),
            ));
        }

        if self.search.regex_cache_size == 0 {
            return Err(PollError::Config(
                "search.regex_cache_size must be greater than zero".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => Ok(()),
            other => Err(PollError::Config(format!("unknown log format: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_search_settings() {
        let config = Config::default();
        assert_eq!(config.search.min_query_length, 2);
        assert_eq!(config.search.cache_max_size, 100);
        assert_eq!(config.search.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.search.regex_cache_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmin_query_length = 3\ncache_ttl_secs = 10").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.search.min_query_length, 3);
        assert_eq!(config.search.cache_ttl_secs, 10);
        // Unspecified fields keep their defaults
        assert_eq!(config.search.cache_max_size, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_rejects_unknown_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, PollError::Config(_)));
    }

    #[test]
    fn test_validate_zero_cache_size() {
        let mut config = Config::default();
        config.search.cache_max_size = 0;
        assert!(config.validate().is_err());
    }
}

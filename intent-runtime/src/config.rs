//! Runtime configuration

use crate::error::{IntentError, Result};
use poll_rs::config::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment prefix for overrides (e.g. `INTENT__LLM__PROVIDER=ollama`)
pub const ENV_PREFIX: &str = "INTENT";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub intent: IntentSettings,
    pub llm: LlmSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntentSettings {
    /// Fall back to the LLM when no regex strategy matches
    pub use_ai: bool,
    pub ai_timeout_secs: u64,
    /// Callers drop results below this confidence
    pub min_confidence: f32,
}

impl IntentSettings {
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }
}

impl Default for IntentSettings {
    fn default() -> Self {
        Self {
            use_ai: false,
            ai_timeout_secs: 10,
            min_confidence: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// "mock" or "ollama"
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "mistral:latest".to_string(),
            base_url: crate::llm::ollama::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IntentError::Config(e.to_string()))?;

        let config: RuntimeConfig =
            toml::from_str(&content).map_err(|e| IntentError::Config(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Layer an optional config file and `INTENT__*` environment variables over the defaults
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

        let config: RuntimeConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.intent.min_confidence) {
            return Err(IntentError::Config(format!(
                "intent.min_confidence must be within [0, 1], got {}",
                self.intent.min_confidence
            )));
        }

        if self.intent.ai_timeout_secs == 0 {
            return Err(IntentError::Config(
                "intent.ai_timeout_secs must be greater than zero".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => {
                return Err(IntentError::Config(format!("unknown log format: {}", other)));
            }
        }

        match self.llm.provider.as_str() {
            "mock" | "ollama" => Ok(()),
            other => Err(IntentError::Config(format!("unknown LLM provider: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(!config.intent.use_ai);
        assert_eq!(config.intent.ai_timeout(), Duration::from_secs(10));
        assert_eq!(config.llm.provider, "mock");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[intent]
use_ai = true

[llm]
provider = "ollama"
model = "llama3.1"
"#
        )
        .unwrap();

        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert!(config.intent.use_ai);
        assert_eq!(config.intent.ai_timeout_secs, 10);
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = RuntimeConfig::default();
        config.llm.provider = "openai".to_string();
        assert!(matches!(config.validate(), Err(IntentError::Config(_))));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut config = RuntimeConfig::default();
        config.intent.min_confidence = 1.5;
        assert!(config.validate().is_err());
    }
}

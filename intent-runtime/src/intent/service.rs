//! Intent detection service
//!
//! Runs the registered strategies against a chat message. Regex strategies
//! always run first, in registration order; AI strategies only run when the
//! caller opts in and none of the regex strategies recognized the message.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::registry::StrategyRegistry;
use super::strategy::IntentDetectionStrategy;
use super::types::{DetectOptions, IntentResult, StrategyKind};
use crate::config::{IntentSettings, RuntimeConfig};
use crate::error::{IntentError, Result};
use crate::llm::build_engine;
use poll_rs::Poll;

pub struct IntentService {
    registry: StrategyRegistry,
}

impl IntentService {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Regex strategies plus the AI fallback backed by the configured engine
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let engine = build_engine(&config.llm)?;
        Ok(Self::new(StrategyRegistry::with_ai(engine)))
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.registry
    }

    /// First modification recognized in `message`, if any.
    ///
    /// No confidence threshold is applied; see [`IntentResult::meets`].
    pub async fn detect_intent(
        &self,
        message: &str,
        poll: &Poll,
        options: &DetectOptions,
    ) -> Option<IntentResult> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        let mut kinds = vec![StrategyKind::Regex];
        if options.use_ai {
            kinds.push(StrategyKind::Ai);
        }

        for kind in kinds {
            let candidates = self
                .registry
                .strategies()
                .iter()
                .filter(|s| s.kind() == kind && s.can_handle(poll.poll_type));

            for strategy in candidates {
                match self.run(strategy, message, poll, options).await {
                    Ok(Some(result)) => {
                        info!(
                            "Intent detected by {}: {} (confidence {:.2})",
                            strategy.name(),
                            result.action.as_ref().map_or("none", |action| action.name()),
                            result.confidence
                        );
                        return Some(result);
                    }
                    Ok(None) => {
                        debug!("Strategy {} did not recognize the message", strategy.name());
                    }
                    Err(err) => {
                        warn!("Strategy {} failed: {:#}", strategy.name(), err);
                    }
                }
            }
        }

        debug!("No intent detected");
        None
    }

    async fn run(
        &self,
        strategy: &Arc<dyn IntentDetectionStrategy>,
        message: &str,
        poll: &Poll,
        options: &DetectOptions,
    ) -> anyhow::Result<Option<IntentResult>> {
        match (strategy.kind(), options.ai_timeout) {
            (StrategyKind::Ai, Some(limit)) => {
                tokio::time::timeout(limit, strategy.detect(message, poll))
                    .await
                    .map_err(|_| IntentError::Timeout(limit))?
            }
            _ => strategy.detect(message, poll).await,
        }
    }
}

impl Default for IntentService {
    fn default() -> Self {
        Self::new(StrategyRegistry::with_defaults())
    }
}

impl From<&IntentSettings> for DetectOptions {
    fn from(settings: &IntentSettings) -> Self {
        Self {
            use_ai: settings.use_ai,
            ai_timeout: Some(settings.ai_timeout()),
        }
    }
}

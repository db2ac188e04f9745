//! Strategy registry
//!
//! Each application context owns its registry; instances share nothing.

use std::sync::Arc;
use tracing::{debug, warn};

use super::strategies::{AiStrategy, DatePollStrategy, FormOptionStrategy, FormQuestionStrategy};
use super::strategy::IntentDetectionStrategy;
use crate::llm::LlmEngine;

/// Ordered list of detection strategies
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn IntentDetectionStrategy>>,
}

impl StrategyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in regex strategies
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Built-in regex strategies followed by the LLM fallback
    pub fn with_ai(engine: Arc<dyn LlmEngine>) -> Self {
        let mut registry = Self::with_defaults();
        registry.add_strategy(Arc::new(AiStrategy::new(engine)));
        registry
    }

    fn register_defaults(&mut self) {
        self.add_strategy(Arc::new(DatePollStrategy::new()));
        self.add_strategy(Arc::new(FormQuestionStrategy::new()));
        self.add_strategy(Arc::new(FormOptionStrategy::new()));
    }

    /// Append a strategy; a strategy with the same name is replaced in place
    pub fn add_strategy(&mut self, strategy: Arc<dyn IntentDetectionStrategy>) {
        if let Some(slot) = self.strategies.iter_mut().find(|s| s.name() == strategy.name()) {
            warn!("Replacing intent strategy {}", strategy.name());
            *slot = strategy;
            return;
        }

        debug!("Registered intent strategy {} ({:?})", strategy.name(), strategy.kind());
        self.strategies.push(strategy);
    }

    /// Remove a strategy by name
    pub fn remove_strategy(&mut self, name: &str) -> bool {
        let before = self.strategies.len();
        self.strategies.retain(|s| s.name() != name);
        before != self.strategies.len()
    }

    /// Back to the built-in regex strategies only
    pub fn reset_strategies(&mut self) {
        self.strategies.clear();
        self.register_defaults();
    }

    /// Registered strategies, in registration order
    pub fn strategies(&self) -> &[Arc<dyn IntentDetectionStrategy>] {
        &self.strategies
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::strategy::MockIntentDetectionStrategy;
    use crate::intent::StrategyKind;
    use crate::llm::MockLlm;

    fn named(name: &'static str) -> Arc<dyn IntentDetectionStrategy> {
        let mut strategy = MockIntentDetectionStrategy::new();
        strategy.expect_name().return_const(name.to_string());
        strategy.expect_kind().return_const(StrategyKind::Regex);
        Arc::new(strategy)
    }

    #[test]
    fn test_defaults_order() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["date-poll", "form-question", "form-option"]);

        let registry = StrategyRegistry::with_ai(Arc::new(MockLlm::new()));
        assert_eq!(registry.names().last(), Some(&"ai"));
    }

    #[test]
    fn test_add_remove_reset() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());

        registry.add_strategy(named("custom"));
        registry.add_strategy(named("other"));
        registry.add_strategy(named("custom"));
        assert_eq!(registry.names(), vec!["custom", "other"]);

        assert!(registry.remove_strategy("custom"));
        assert!(!registry.remove_strategy("custom"));
        assert_eq!(registry.len(), 1);

        registry.reset_strategies();
        assert_eq!(registry.len(), 3);
        assert!(!registry.names().contains(&"other"));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = StrategyRegistry::with_defaults();
        let second = StrategyRegistry::with_defaults();

        first.remove_strategy("date-poll");
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);
    }
}

//! Intent detection types

use poll_rs::reducer::PollAction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Family a strategy belongs to; regex strategies always run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Regex,
    Ai,
}

/// Part of the poll an intent touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifiedField {
    Title,
    Dates,
    TimeSlots,
    Questions,
    Options,
    Required,
    QuestionType,
}

/// A detected poll modification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    pub is_modification: bool,
    pub action: Option<PollAction>,
    /// Between 0 and 1
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_field: Option<ModifiedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_question_id: Option<String>,
    pub strategy: StrategyKind,
}

impl IntentResult {
    /// A modification carrying `action`
    pub fn modification(
        action: PollAction,
        confidence: f32,
        modified_field: ModifiedField,
        strategy: StrategyKind,
    ) -> Self {
        Self {
            is_modification: true,
            action: Some(action),
            confidence: confidence.clamp(0.0, 1.0),
            explanation: None,
            modified_field: Some(modified_field),
            modified_question_id: None,
            strategy,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_question_id(mut self, question_id: Option<String>) -> Self {
        self.modified_question_id = question_id;
        self
    }

    /// Acceptance check for callers that enforce a confidence floor
    pub fn meets(&self, threshold: f32) -> bool {
        self.is_modification && self.action.is_some() && self.confidence >= threshold
    }
}

/// Per-call detection switches
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Allow AI strategies once every regex strategy has passed
    pub use_ai: bool,
    pub ai_timeout: Option<Duration>,
}

impl DetectOptions {
    pub fn with_ai(timeout: Duration) -> Self {
        Self {
            use_ai: true,
            ai_timeout: Some(timeout),
        }
    }
}

//! LLM Engine abstraction

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::config::LlmSettings;
use crate::error::IntentError;

pub mod mock;
pub mod ollama;
pub mod tools;

pub use mock::MockLlm;
pub use ollama::OllamaLlm;
pub use tools::{poll_tools, Tool, ToolParameter};

/// LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Tool calls requested by the LLM
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason (completed, tool_calls, ...)
    pub finish_reason: String,
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

/// Message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// LLM Engine trait
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmEngine: Send + Sync {
    /// Generate a response from messages
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<serde_json::Value>>,
    ) -> Result<LlmResponse>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Engine selected by `settings.provider`
pub fn build_engine(settings: &LlmSettings) -> crate::error::Result<Arc<dyn LlmEngine>> {
    let engine: Arc<dyn LlmEngine> = match settings.provider.as_str() {
        "mock" => Arc::new(MockLlm::new()),
        "ollama" => Arc::new(
            OllamaLlm::new(settings.model.clone()).with_base_url(settings.base_url.clone()),
        ),
        other => {
            return Err(IntentError::Config(format!("unknown LLM provider: {}", other)));
        }
    };

    info!("Using LLM engine {} ({})", settings.provider, engine.model_name());

    Ok(engine)
}

//! Mock LLM for testing
//!
//! This mock LLM uses simple keyword matching to detect poll edits
//! and generate the matching tool calls.

use super::{tools, LlmEngine, LlmResponse, Message, MessageRole, ToolCall};
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Confidence attached to every mock tool call
const MOCK_CONFIDENCE: f64 = 0.8;

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["«“]\s*([^"»”]+?)\s*["»”]"#).expect("QUOTED: hardcoded regex is valid")
});

static ASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:demande[rz]?|ask)\s+(?:aux\s+participants\s+|aux\s+gens\s+|(?:the\s+)?participants\s+|people\s+)?(?:leur\s+|their\s+|s'ils\s+|si\s+|if\s+)?(?P<subject>.+?)\s*[.!?]?\s*$",
    )
    .expect("ASK: hardcoded regex is valid")
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("ISO_DATE: hardcoded regex is valid"));

/// Mock LLM implementation for testing
pub struct MockLlm {
    model_name: String,
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            model_name: "mock-llm-v1".to_string(),
        }
    }

    /// Parse user message and extract intent
    fn parse_intent(&self, message: &str) -> Option<ToolCall> {
        let message_lower = message.to_lowercase();

        // Intent: rename the poll ("titre" / "title" plus a quoted value)
        if message_lower.contains("titre") || message_lower.contains("title") || message_lower.contains("appelle") {
            if let Some(call) = self.parse_title(message) {
                return Some(call);
            }
        }

        // Intent: ask participants something
        if message_lower.contains("demande") || message_lower.contains("ask") {
            if let Some(call) = self.parse_question(message) {
                return Some(call);
            }
        }

        // Intent: a date to propose
        if message_lower.contains("date") || message_lower.contains("jour") || message_lower.contains("day") {
            return self.parse_date(message);
        }

        None
    }

    fn parse_title(&self, message: &str) -> Option<ToolCall> {
        let title = QUOTED.captures(message)?.get(1)?.as_str();

        Some(tool_call(tools::UPDATE_TITLE, [("title", serde_json::json!(title))]))
    }

    fn parse_question(&self, message: &str) -> Option<ToolCall> {
        let subject = ASK.captures(message.trim())?.name("subject")?.as_str().trim();
        if subject.is_empty() {
            return None;
        }

        Some(tool_call(tools::ADD_QUESTION, [("subject", serde_json::json!(subject))]))
    }

    fn parse_date(&self, message: &str) -> Option<ToolCall> {
        let date = ISO_DATE.find(message)?.as_str();

        Some(tool_call(tools::ADD_DATE, [("date", serde_json::json!(date))]))
    }
}

fn tool_call<const N: usize>(name: &str, arguments: [(&str, serde_json::Value); N]) -> ToolCall {
    let mut arguments: HashMap<String, serde_json::Value> = arguments
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    arguments.insert("confidence".to_string(), serde_json::json!(MOCK_CONFIDENCE));

    ToolCall {
        name: name.to_string(),
        arguments,
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmEngine for MockLlm {
    async fn generate(
        &self,
        messages: Vec<Message>,
        _tools: Option<Vec<serde_json::Value>>,
    ) -> Result<LlmResponse> {
        debug!("MockLLM: Processing {} messages", messages.len());

        // Get last user message
        let user_message = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if let Some(tool_call) = self.parse_intent(user_message) {
            debug!("MockLLM: Detected tool call: {}", tool_call.name);

            Ok(LlmResponse {
                text: String::new(),
                tool_calls: vec![tool_call],
                finish_reason: "tool_calls".to_string(),
            })
        } else {
            Ok(LlmResponse {
                text: "Je n'ai pas compris quelle modification apporter au sondage.".to_string(),
                tool_calls: Vec::new(),
                finish_reason: "completed".to_string(),
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn generate(content: &str) -> LlmResponse {
        MockLlm::new()
            .generate(vec![Message::system("context"), Message::user(content)], None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_llm_title() {
        let response = generate("Le titre devrait être « Pot de départ de Julie »").await;

        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "update_title");
        assert_eq!(response.tool_calls[0].arguments["title"], "Pot de départ de Julie");
        assert_eq!(response.tool_calls[0].arguments["confidence"], 0.8);
    }

    #[tokio::test]
    async fn test_mock_llm_question() {
        let response = generate("Demande aux participants leur allergies alimentaires").await;

        assert_eq!(response.tool_calls[0].name, "add_question");
        assert_eq!(response.tool_calls[0].arguments["subject"], "allergies alimentaires");
    }

    #[tokio::test]
    async fn test_mock_llm_date() {
        let response = generate("Et si on prenait la date du 2025-07-04 ?").await;

        assert_eq!(response.tool_calls[0].name, "add_date");
        assert_eq!(response.tool_calls[0].arguments["date"], "2025-07-04");
        assert_eq!(response.finish_reason, "tool_calls");
    }

    #[tokio::test]
    async fn test_mock_llm_no_intent() {
        let response = generate("Merci !").await;

        assert!(response.tool_calls.is_empty());
        assert_eq!(response.finish_reason, "completed");
        assert!(!response.text.is_empty());
    }
}

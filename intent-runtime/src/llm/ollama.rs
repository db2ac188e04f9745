//! Ollama LLM implementation
//!
//! This implementation uses Ollama's HTTP API with function calling support.

use super::{LlmEngine, LlmResponse, Message, MessageRole, ToolCall};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama LLM implementation
pub struct OllamaLlm {
    model_name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaLlm {
    pub fn new(model_name: String) -> Self {
        Self {
            model_name,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OllamaMessage {
    role: MessageRole,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OllamaToolCall {
    function: OllamaFunction,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct OllamaFunction {
    name: String,
    arguments: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
}

impl From<Message> for OllamaMessage {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: message.content,
            tool_calls: None,
        }
    }
}

impl From<OllamaChatResponse> for LlmResponse {
    fn from(response: OllamaChatResponse) -> Self {
        let tool_calls: Vec<ToolCall> = response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let finish_reason = if tool_calls.is_empty() {
            "completed"
        } else {
            "tool_calls"
        };

        LlmResponse {
            text: response.message.content,
            tool_calls,
            finish_reason: finish_reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LlmEngine for OllamaLlm {
    async fn generate(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<serde_json::Value>>,
    ) -> Result<LlmResponse> {
        debug!("OllamaLLM: Processing {} messages with model {}", messages.len(), self.model_name);

        let request = OllamaChatRequest {
            model: self.model_name.clone(),
            messages: messages.into_iter().map(OllamaMessage::from).collect(),
            tools,
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("OllamaLLM: Request failed with status {}: {}", status, error_text);
            anyhow::bail!("Ollama request failed: {} - {}", status, error_text);
        }

        let ollama_response: OllamaChatResponse = response.json().await?;
        debug!(
            "OllamaLLM: Received response, done={}, tool_calls={}",
            ollama_response.done,
            ollama_response.message.tool_calls.as_ref().map_or(0, Vec::len)
        );

        Ok(ollama_response.into())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::poll_tools;

    #[test]
    fn test_request_serialization() {
        let request = OllamaChatRequest {
            model: "mistral:latest".to_string(),
            messages: vec![Message::system("rules").into(), Message::user("hello").into()],
            tools: None,
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("tools").is_none());
        assert!(json["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn test_response_with_tool_calls() {
        let raw = serde_json::json!({
            "model": "mistral:latest",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": "add_date",
                        "arguments": { "date": "2025-06-01", "confidence": 0.9 }
                    }
                }]
            },
            "done": true
        });

        let response: LlmResponse = serde_json::from_value::<OllamaChatResponse>(raw)
            .unwrap()
            .into();
        assert_eq!(response.finish_reason, "tool_calls");
        assert_eq!(response.tool_calls[0].name, "add_date");
        assert_eq!(response.tool_calls[0].arguments["date"], "2025-06-01");
    }

    #[test]
    fn test_response_text_only() {
        let raw = serde_json::json!({
            "message": { "role": "assistant", "content": "Bonjour" },
            "done": true
        });

        let response: LlmResponse = serde_json::from_value::<OllamaChatResponse>(raw)
            .unwrap()
            .into();
        assert_eq!(response.finish_reason, "completed");
        assert!(response.tool_calls.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let llm = OllamaLlm::new("mistral:latest".to_string())
            .with_base_url("http://ollama:11434/".to_string());
        assert_eq!(llm.base_url(), "http://ollama:11434");
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_with_poll_tools() {
        let llm = OllamaLlm::new("mistral:latest".to_string());

        let messages = vec![Message::user("Ajoute le 12 juin 2025 au sondage")];
        let tools = poll_tools().iter().map(|t| t.to_schema()).collect();

        let response = llm.generate(messages, Some(tools)).await;
        assert!(response.is_ok());
        println!("Response: {:?}", response.unwrap());
    }
}

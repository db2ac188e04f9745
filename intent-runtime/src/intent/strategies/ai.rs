//! LLM-backed fallback strategy
//!
//! Sends the poll and the chat message to an [`LlmEngine`] together with the
//! poll tool catalogue, then maps the first tool call onto a [`PollAction`].

use async_trait::async_trait;
use poll_rs::poll::QuestionKind;
use poll_rs::reducer::{FormPollAction, PollAction};
use poll_rs::{Poll, PollType};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::question_id;
use crate::error::{IntentError, Result};
use crate::intent::strategy::IntentDetectionStrategy;
use crate::intent::types::{IntentResult, ModifiedField, StrategyKind};
use crate::llm::{poll_tools, tools, LlmEngine, Message, ToolCall};

/// Confidence assumed when the model does not report one
pub const DEFAULT_AI_CONFIDENCE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "Tu es l'assistant d'édition de sondages. \
L'utilisateur décrit une modification du sondage courant. \
Appelle exactement un outil correspondant à cette modification, avec une confiance entre 0 et 1. \
Les dates sont au format YYYY-MM-DD, les heures au format HH:MM, les questions sont numérotées à partir de 1. \
Si le message ne demande aucune modification, réponds sans appeler d'outil.";

/// Falls back to an LLM when no regex strategy understood the message
pub struct AiStrategy {
    engine: Arc<dyn LlmEngine>,
    tool_schemas: Vec<Value>,
}

impl AiStrategy {
    pub const NAME: &'static str = "ai";

    pub fn new(engine: Arc<dyn LlmEngine>) -> Self {
        Self {
            engine,
            tool_schemas: poll_tools().iter().map(|tool| tool.to_schema()).collect(),
        }
    }

    fn messages(&self, message: &str, poll: &Poll) -> Vec<Message> {
        vec![
            Message::system(SYSTEM_PROMPT),
            Message::system(format!("Sondage courant : {}", poll_context(poll))),
            Message::user(message),
        ]
    }
}

/// Compact view of the poll given to the model
fn poll_context(poll: &Poll) -> Value {
    let questions: Vec<Value> = poll
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            json!({
                "number": index + 1,
                "title": question.title,
                "kind": question.kind,
                "required": question.required,
                "options": question
                    .options
                    .iter()
                    .flatten()
                    .map(|option| option.label.as_str())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "type": poll.poll_type,
        "title": poll.title,
        "dates": poll.dates,
        "timeSlots": poll.time_slots,
        "questions": questions,
    })
}

/// Map a tool call onto the poll action it stands for
pub fn tool_call_to_action(call: &ToolCall) -> Result<(PollAction, ModifiedField)> {
    let action = match call.name.as_str() {
        tools::ADD_DATE => (
            PollAction::AddDate { date: string_arg(call, "date")? },
            ModifiedField::Dates,
        ),
        tools::REMOVE_DATE => (
            PollAction::RemoveDate { date: string_arg(call, "date")? },
            ModifiedField::Dates,
        ),
        tools::UPDATE_TITLE => (
            PollAction::UpdateTitle { title: string_arg(call, "title")? },
            ModifiedField::Title,
        ),
        tools::ADD_TIMESLOT => (
            PollAction::AddTimeslot {
                date: string_arg(call, "date")?,
                start: string_arg(call, "start")?,
                end: string_arg(call, "end")?,
            },
            ModifiedField::TimeSlots,
        ),
        tools::ADD_QUESTION => (
            FormPollAction::AddQuestion { subject: string_arg(call, "subject")? }.into(),
            ModifiedField::Questions,
        ),
        tools::REMOVE_QUESTION => (
            FormPollAction::RemoveQuestion { question_index: question_index_arg(call)? }.into(),
            ModifiedField::Questions,
        ),
        tools::CHANGE_QUESTION_TYPE => {
            let raw = string_arg(call, "new_type")?;
            let new_type: QuestionKind = serde_json::from_value(json!(raw.to_lowercase()))
                .map_err(|_| IntentError::invalid_payload(&call.name, format!("unknown question kind {:?}", raw)))?;
            (
                FormPollAction::ChangeQuestionType {
                    question_index: question_index_arg(call)?,
                    new_type,
                }
                .into(),
                ModifiedField::QuestionType,
            )
        }
        tools::ADD_OPTION => (
            FormPollAction::AddOption {
                question_index: question_index_arg(call)?,
                option_text: string_arg(call, "option_text")?,
            }
            .into(),
            ModifiedField::Options,
        ),
        tools::REMOVE_OPTION => (
            FormPollAction::RemoveOption {
                question_index: question_index_arg(call)?,
                option_text: string_arg(call, "option_text")?,
            }
            .into(),
            ModifiedField::Options,
        ),
        tools::SET_REQUIRED => (
            FormPollAction::SetRequired {
                question_index: question_index_arg(call)?,
                required: bool_arg(call, "required")?,
            }
            .into(),
            ModifiedField::Required,
        ),
        tools::RENAME_QUESTION => (
            FormPollAction::RenameQuestion {
                question_index: question_index_arg(call)?,
                new_title: string_arg(call, "new_title")?,
            }
            .into(),
            ModifiedField::Questions,
        ),
        other => {
            return Err(IntentError::invalid_payload(other, "unknown tool"));
        }
    };

    Ok(action)
}

fn argument<'a>(call: &'a ToolCall, name: &str) -> Result<&'a Value> {
    call.arguments
        .get(name)
        .filter(|value| !value.is_null())
        .ok_or_else(|| IntentError::invalid_payload(&call.name, format!("missing argument {}", name)))
}

fn string_arg(call: &ToolCall, name: &str) -> Result<String> {
    match argument(call, name)? {
        Value::String(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Value::Number(value) => Ok(value.to_string()),
        _ => Err(IntentError::invalid_payload(
            &call.name,
            format!("{} must be a non-empty string", name),
        )),
    }
}

fn bool_arg(call: &ToolCall, name: &str) -> Result<bool> {
    match argument(call, name)? {
        Value::Bool(value) => Ok(*value),
        Value::String(value) => value
            .trim()
            .parse()
            .map_err(|_| IntentError::invalid_payload(&call.name, format!("{} must be a boolean", name))),
        _ => Err(IntentError::invalid_payload(&call.name, format!("{} must be a boolean", name))),
    }
}

/// Zero-based index from the one-based `question_number` argument
fn question_index_arg(call: &ToolCall) -> Result<usize> {
    let value = argument(call, "question_number")?;
    let number = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0 && *n >= 0.0).map(|n| n as u64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    number
        .and_then(|n| usize::try_from(n).ok())
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| {
            IntentError::invalid_payload(&call.name, format!("invalid question_number {}", value))
        })
}

/// Self-reported confidence, clamped to [0, 1]
fn confidence(call: &ToolCall) -> f32 {
    call.arguments
        .get("confidence")
        .and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .filter(|value| value.is_finite())
        .map_or(DEFAULT_AI_CONFIDENCE, |value| value.clamp(0.0, 1.0) as f32)
}

#[async_trait]
impl IntentDetectionStrategy for AiStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ai
    }

    fn can_handle(&self, poll_type: PollType) -> bool {
        matches!(poll_type, PollType::Date | PollType::Form)
    }

    async fn detect(&self, message: &str, poll: &Poll) -> anyhow::Result<Option<IntentResult>> {
        let response = self
            .engine
            .generate(self.messages(message, poll), Some(self.tool_schemas.clone()))
            .await?;

        let Some(call) = response.tool_calls.first() else {
            debug!("{} answered without a tool call", self.engine.model_name());
            return Ok(None);
        };

        let (action, field) = tool_call_to_action(call)?;
        info!(
            "{} proposed {} for poll {}",
            self.engine.model_name(),
            action.name(),
            poll.id
        );

        let modified_question = match &action {
            PollAction::Form(form_action) => form_question_index(form_action)
                .and_then(|index| question_id(poll, index)),
            _ => None,
        };

        let mut result = IntentResult::modification(action, confidence(call), field, StrategyKind::Ai)
            .with_question_id(modified_question);
        if !response.text.trim().is_empty() {
            result = result.with_explanation(response.text.trim());
        }

        Ok(Some(result))
    }
}

fn form_question_index(action: &FormPollAction) -> Option<usize> {
    match action {
        FormPollAction::RemoveQuestion { question_index }
        | FormPollAction::ChangeQuestionType { question_index, .. }
        | FormPollAction::AddOption { question_index, .. }
        | FormPollAction::RemoveOption { question_index, .. }
        | FormPollAction::SetRequired { question_index, .. }
        | FormPollAction::RenameQuestion { question_index, .. } => Some(*question_index),
        FormPollAction::ReplacePoll(_) | FormPollAction::AddQuestion { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlmEngine};
    use std::collections::HashMap;

    fn call(name: &str, arguments: Value) -> ToolCall {
        let arguments: HashMap<String, Value> = serde_json::from_value(arguments).unwrap();
        ToolCall {
            name: name.to_string(),
            arguments,
        }
    }

    fn engine_returning(calls: Vec<ToolCall>, text: &str) -> Arc<dyn LlmEngine> {
        let mut engine = MockLlmEngine::new();
        let text = text.to_string();
        engine.expect_generate().times(1).returning(move |_, tools| {
            assert!(tools.is_some_and(|tools| tools.len() == poll_tools().len()));
            Ok(LlmResponse {
                text: text.clone(),
                finish_reason: if calls.is_empty() { "completed" } else { "tool_calls" }.to_string(),
                tool_calls: calls.clone(),
            })
        });
        engine.expect_model_name().return_const("mock".to_string());
        Arc::new(engine)
    }

    #[test]
    fn test_tool_call_mapping() {
        let (action, field) =
            tool_call_to_action(&call("add_timeslot", json!({"date": "2025-06-01", "start": "10:00", "end": "11:00"})))
                .unwrap();
        assert_eq!(
            action,
            PollAction::AddTimeslot {
                date: "2025-06-01".into(),
                start: "10:00".into(),
                end: "11:00".into(),
            }
        );
        assert_eq!(field, ModifiedField::TimeSlots);

        let (action, _) =
            tool_call_to_action(&call("change_question_type", json!({"question_number": 2, "new_type": "Multiple"})))
                .unwrap();
        assert_eq!(
            action,
            FormPollAction::ChangeQuestionType {
                question_index: 1,
                new_type: QuestionKind::Multiple,
            }
            .into()
        );

        let (action, _) =
            tool_call_to_action(&call("set_required", json!({"question_number": "1", "required": "true"})))
                .unwrap();
        assert_eq!(
            action,
            FormPollAction::SetRequired {
                question_index: 0,
                required: true,
            }
            .into()
        );
    }

    #[test]
    fn test_invalid_payloads() {
        let missing = tool_call_to_action(&call("add_date", json!({})));
        assert!(matches!(missing, Err(IntentError::InvalidPayload { .. })));

        let zero = tool_call_to_action(&call("remove_question", json!({"question_number": 0})));
        assert!(matches!(zero, Err(IntentError::InvalidPayload { .. })));

        let kind = tool_call_to_action(&call("change_question_type", json!({"question_number": 1, "new_type": "slider"})));
        assert!(matches!(kind, Err(IntentError::InvalidPayload { .. })));

        let unknown = tool_call_to_action(&call("send_email", json!({})));
        assert!(matches!(unknown, Err(IntentError::InvalidPayload { tool, .. }) if tool == "send_email"));
    }

    #[test]
    fn test_confidence_default_and_clamp() {
        assert_eq!(confidence(&call("add_date", json!({}))), DEFAULT_AI_CONFIDENCE);
        assert_eq!(confidence(&call("add_date", json!({"confidence": 3.0}))), 1.0);
        assert_eq!(confidence(&call("add_date", json!({"confidence": -1}))), 0.0);
        assert_eq!(confidence(&call("add_date", json!({"confidence": "0.5"}))), 0.5);
    }

    #[tokio::test]
    async fn test_detect_maps_first_tool_call() {
        let mut poll = Poll::new_form("Repas");
        poll.questions.push(poll_rs::poll::FormQuestion::text("Commentaires"));

        let engine = engine_returning(
            vec![
                call("rename_question", json!({"question_number": 1, "new_title": "Remarques", "confidence": 0.85})),
                call("add_question", json!({"subject": "Dessert"})),
            ],
            "Je renomme la première question.",
        );

        let result = AiStrategy::new(engine)
            .detect("la première question devrait s'appeler Remarques", &poll)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.strategy, StrategyKind::Ai);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.modified_question_id.as_deref(), Some(poll.questions[0].id.as_str()));
        assert_eq!(result.explanation.as_deref(), Some("Je renomme la première question."));
        assert_eq!(
            result.action,
            Some(
                FormPollAction::RenameQuestion {
                    question_index: 0,
                    new_title: "Remarques".into(),
                }
                .into()
            )
        );
    }

    #[tokio::test]
    async fn test_detect_without_tool_call() {
        let engine = engine_returning(Vec::new(), "Bonjour !");
        let result = AiStrategy::new(engine)
            .detect("bonjour", &Poll::new_date("Dîner"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_poll_context_shape() {
        let mut poll = Poll::new_form("Repas");
        poll.questions.push(poll_rs::poll::FormQuestion::single("Plat", &["Poisson", "Viande"]));

        let context = poll_context(&poll);
        assert_eq!(context["type"], "form");
        assert_eq!(context["questions"][0]["number"], 1);
        assert_eq!(context["questions"][0]["kind"], "single");
        assert_eq!(context["questions"][0]["options"][1], "Viande");
    }
}

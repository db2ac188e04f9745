//! Form option commands

use async_trait::async_trait;
use poll_rs::reducer::FormPollAction;
use poll_rs::{Poll, PollType};
use regex::Regex;
use std::sync::LazyLock;

use super::{find_question_index, has_add_verb, has_remove_verb, question_id, REGEX_CONFIDENCE};
use crate::intent::strategy::IntentDetectionStrategy;
use crate::intent::types::{IntentResult, ModifiedField, StrategyKind};

/// `l'option X à la question 2`, `the answer "X" from the last question`
static OPTION_ON_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:option|choix|réponse|reponse|answer|choice)\s+["«“]?\s*(?P<label>.+?)\s*["»”]?\s+(?P<target>(?:à|au|a|dans|sur|de|du|to|in|on|for|from|pour)\s+(?:la\s+|le\s+|the\s+)?(?:\p{L}+\s+)?(?:question|q\s*\d).*)$"#,
    )
    .expect("OPTION_ON_QUESTION: hardcoded regex is valid")
});

/// Adds and removes answer options on form questions
#[derive(Debug, Default)]
pub struct FormOptionStrategy;

impl FormOptionStrategy {
    pub const NAME: &'static str = "form-option";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntentDetectionStrategy for FormOptionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Regex
    }

    fn can_handle(&self, poll_type: PollType) -> bool {
        poll_type == PollType::Form
    }

    async fn detect(&self, message: &str, poll: &Poll) -> anyhow::Result<Option<IntentResult>> {
        let removing = has_remove_verb(message);
        if !removing && !has_add_verb(message) {
            return Ok(None);
        }

        let Some(caps) = OPTION_ON_QUESTION.captures(message.trim()) else {
            return Ok(None);
        };
        let Some(index) = find_question_index(&caps["target"], poll.questions.len()) else {
            return Ok(None);
        };
        let option_text = caps["label"].trim().to_string();
        if option_text.is_empty() {
            return Ok(None);
        }

        let (action, explanation) = if removing {
            let explanation = format!("Suppression de l'option « {} » (question {})", option_text, index + 1);
            (
                FormPollAction::RemoveOption {
                    question_index: index,
                    option_text,
                },
                explanation,
            )
        } else {
            let explanation = format!("Ajout de l'option « {} » (question {})", option_text, index + 1);
            (
                FormPollAction::AddOption {
                    question_index: index,
                    option_text,
                },
                explanation,
            )
        };

        Ok(Some(
            IntentResult::modification(
                action.into(),
                REGEX_CONFIDENCE,
                ModifiedField::Options,
                StrategyKind::Regex,
            )
            .with_question_id(question_id(poll, index))
            .with_explanation(explanation),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poll_rs::poll::FormQuestion;
    use poll_rs::reducer::PollAction;

    fn form_poll() -> Poll {
        let mut poll = Poll::new_form("Repas");
        poll.questions.push(FormQuestion::single("Entrée", &["Salade", "Soupe"]));
        poll.questions.push(FormQuestion::single("Plat", &["Poisson", "Viande"]));
        poll
    }

    async fn action(message: &str) -> Option<PollAction> {
        FormOptionStrategy::new()
            .detect(message, &form_poll())
            .await
            .unwrap()
            .and_then(|result| result.action)
    }

    fn add(question_index: usize, option_text: &str) -> Option<PollAction> {
        Some(
            FormPollAction::AddOption {
                question_index,
                option_text: option_text.to_string(),
            }
            .into(),
        )
    }

    #[tokio::test]
    async fn test_add_option_phrasings() {
        assert_eq!(action("Ajoute l'option Peut-être à la question 2").await, add(1, "Peut-être"));
        assert_eq!(action("add option Maybe to question 1").await, add(0, "Maybe"));
        assert_eq!(
            action("ajoute le choix « Végétarien » à la deuxième question").await,
            add(1, "Végétarien")
        );
        assert_eq!(
            action("Ajoute l'option Salle de bain à la question 1").await,
            add(0, "Salle de bain")
        );
        assert_eq!(action("add the choice \"Other\" to Q2").await, add(1, "Other"));
    }

    #[tokio::test]
    async fn test_remove_option() {
        assert_eq!(
            action("supprime l'option Soupe de la question 1").await,
            Some(
                FormPollAction::RemoveOption {
                    question_index: 0,
                    option_text: "Soupe".into(),
                }
                .into()
            )
        );
        assert_eq!(
            action("remove the answer Viande from the last question").await,
            Some(
                FormPollAction::RemoveOption {
                    question_index: 1,
                    option_text: "Viande".into(),
                }
                .into()
            )
        );
    }

    #[tokio::test]
    async fn test_requires_question_reference() {
        assert_eq!(action("ajoute l'option Dessert").await, None);
        assert_eq!(action("l'option Soupe de la question 1 est bien").await, None);
    }

    #[tokio::test]
    async fn test_metadata() {
        let poll = form_poll();
        let result = FormOptionStrategy::new()
            .detect("ajoute l'option Frites à la question 2", &poll)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.modified_field, Some(ModifiedField::Options));
        assert_eq!(result.modified_question_id.as_deref(), Some(poll.questions[1].id.as_str()));
    }
}

//! Form question commands

use async_trait::async_trait;
use poll_rs::poll::QuestionKind;
use poll_rs::reducer::FormPollAction;
use poll_rs::{Poll, PollType};
use regex::Regex;
use std::sync::LazyLock;

use super::{
    capitalize, detect_title, find_question_index, has_add_verb, has_remove_verb, question_id,
    REGEX_CONFIDENCE,
};
use crate::intent::strategy::IntentDetectionStrategy;
use crate::intent::types::{IntentResult, ModifiedField, StrategyKind};

static ADD_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bquestion\s+(?:sur|à\s+propos\s+d[eu']|a\s+propos\s+d[eu']|concernant|about|on|regarding)\s*(?:le\s+|la\s+|les\s+|l'|the\s+)?(?P<subject>.+?)\s*[.!?]?\s*$",
    )
    .expect("ADD_QUESTION: hardcoded regex is valid")
});

static CHANGE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:transforme[rz]?|change[rz]?|convertis|convertir|convert|passe[rz]?|mets|turn|make)\b.*\b(?:en|to|into|as)\s+(?:une?\s+|an?\s+)?(?:question\s+)?(?:à\s+|a\s+)?(?P<kind>choix\s+multiples?|choix\s+unique|multiple(?:\s+choice)?|single(?:\s+choice)?|texte(?:\s+libre)?|free\s+text|text|matrice|matrix|cases?\s+à\s+cocher|checkbox(?:es)?|radio)\b",
    )
    .expect("CHANGE_TYPE: hardcoded regex is valid")
});

static OPTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:facultati(?:f|ve)|optionnel(?:le)?|optional|pas\s+obligatoire|non\s+obligatoire|not\s+required)\b")
        .expect("OPTIONAL: hardcoded regex is valid")
});

static REQUIRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:obligatoire|requise?|required|mandatory)\b")
        .expect("REQUIRED: hardcoded regex is valid")
});

static RENAME_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:renomme[rz]?|rename|reformule[rz]?|rephrase|retitle)\b(?P<target>.*?\bquestion\b.*?)\s(?:en|to|as|par|:)\s*["«“]?\s*(?P<title>.+?)\s*["»”]?\s*[.!]?\s*$"#,
    )
    .expect("RENAME_QUESTION: hardcoded regex is valid")
});

/// Mentions of answer options; those messages belong to [`super::FormOptionStrategy`]
static OPTION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:options?|choix|réponses?|reponses?|answers?|choices?)\b")
        .expect("OPTION_WORD: hardcoded regex is valid")
});

/// Adds, removes, retypes and renames form questions
#[derive(Debug, Default)]
pub struct FormQuestionStrategy;

impl FormQuestionStrategy {
    pub const NAME: &'static str = "form-question";

    pub fn new() -> Self {
        Self
    }

    fn question_result(
        &self,
        action: FormPollAction,
        field: ModifiedField,
        poll: &Poll,
        index: usize,
        explanation: String,
    ) -> IntentResult {
        IntentResult::modification(action.into(), REGEX_CONFIDENCE, field, StrategyKind::Regex)
            .with_question_id(question_id(poll, index))
            .with_explanation(explanation)
    }

    fn detect_rename(&self, message: &str, poll: &Poll) -> Option<IntentResult> {
        let caps = RENAME_QUESTION.captures(message.trim())?;
        let index = find_question_index(&caps["target"], poll.questions.len())?;
        let new_title = caps["title"].trim().to_string();
        if new_title.is_empty() {
            return None;
        }

        let explanation = format!("Nouveau libellé de la question {} : {}", index + 1, new_title);
        Some(self.question_result(
            FormPollAction::RenameQuestion {
                question_index: index,
                new_title,
            },
            ModifiedField::Questions,
            poll,
            index,
            explanation,
        ))
    }

    fn detect_change_type(&self, message: &str, poll: &Poll) -> Option<IntentResult> {
        let caps = CHANGE_TYPE.captures(message)?;
        let new_type = kind_from_words(&caps["kind"])?;
        let index = find_question_index(message, poll.questions.len())?;

        Some(self.question_result(
            FormPollAction::ChangeQuestionType {
                question_index: index,
                new_type,
            },
            ModifiedField::QuestionType,
            poll,
            index,
            format!("Question {} convertie en {:?}", index + 1, new_type),
        ))
    }

    fn detect_required(&self, message: &str, poll: &Poll) -> Option<IntentResult> {
        // "ajoute l'option Obligatoire" edits options, not the flag
        if OPTION_WORD.is_match(message) && (has_add_verb(message) || has_remove_verb(message)) {
            return None;
        }
        let required = if OPTIONAL.is_match(message) {
            false
        } else if REQUIRED.is_match(message) {
            true
        } else {
            return None;
        };
        let index = find_question_index(message, poll.questions.len())?;

        let explanation = if required {
            format!("Question {} rendue obligatoire", index + 1)
        } else {
            format!("Question {} rendue facultative", index + 1)
        };
        Some(self.question_result(
            FormPollAction::SetRequired {
                question_index: index,
                required,
            },
            ModifiedField::Required,
            poll,
            index,
            explanation,
        ))
    }

    fn detect_remove(&self, message: &str, poll: &Poll) -> Option<IntentResult> {
        if !has_remove_verb(message) || OPTION_WORD.is_match(message) {
            return None;
        }
        let index = find_question_index(message, poll.questions.len())?;

        Some(self.question_result(
            FormPollAction::RemoveQuestion { question_index: index },
            ModifiedField::Questions,
            poll,
            index,
            format!("Suppression de la question {}", index + 1),
        ))
    }

    fn detect_add(&self, message: &str) -> Option<IntentResult> {
        if !has_add_verb(message) {
            return None;
        }
        let caps = ADD_QUESTION.captures(message.trim())?;
        let subject = capitalize(caps["subject"].trim());
        if subject.is_empty() {
            return None;
        }

        let explanation = format!("Ajout d'une question sur « {} »", subject);
        Some(
            IntentResult::modification(
                FormPollAction::AddQuestion { subject }.into(),
                REGEX_CONFIDENCE,
                ModifiedField::Questions,
                StrategyKind::Regex,
            )
            .with_explanation(explanation),
        )
    }
}

fn kind_from_words(words: &str) -> Option<QuestionKind> {
    let words = words.to_lowercase();
    if words.contains("multipl") || words.contains("checkbox") || words.contains("cocher") {
        Some(QuestionKind::Multiple)
    } else if words.contains("unique") || words.contains("single") || words.contains("radio") {
        Some(QuestionKind::Single)
    } else if words.contains("text") {
        Some(QuestionKind::Text)
    } else if words.contains("matri") {
        Some(QuestionKind::Matrix)
    } else {
        None
    }
}

#[async_trait]
impl IntentDetectionStrategy for FormQuestionStrategy {
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
        let result = self
            .detect_rename(message, poll)
            .or_else(|| detect_title(message))
            .or_else(|| self.detect_change_type(message, poll))
            .or_else(|| self.detect_required(message, poll))
            .or_else(|| self.detect_remove(message, poll))
            .or_else(|| self.detect_add(message));

        Ok(result)
    }
}

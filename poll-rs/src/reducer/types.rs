//! Reducer actions and outcomes

use crate::poll::{MutationHint, Poll, QuestionKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mutations of a form poll's questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormPollAction {
    /// Load or reset the whole document
    ReplacePoll(Poll),
    #[serde(rename_all = "camelCase")]
    AddQuestion { subject: String },
    #[serde(rename_all = "camelCase")]
    RemoveQuestion { question_index: usize },
    #[serde(rename_all = "camelCase")]
    ChangeQuestionType {
        question_index: usize,
        new_type: QuestionKind,
    },
    #[serde(rename_all = "camelCase")]
    AddOption {
        question_index: usize,
        option_text: String,
    },
    #[serde(rename_all = "camelCase")]
    RemoveOption {
        question_index: usize,
        option_text: String,
    },
    #[serde(rename_all = "camelCase")]
    SetRequired {
        question_index: usize,
        required: bool,
    },
    #[serde(rename_all = "camelCase")]
    RenameQuestion {
        question_index: usize,
        new_title: String,
    },
}

/// Mutations of a poll, form actions included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollAction {
    ReplacePoll(Poll),
    AddDate { date: String },
    RemoveDate { date: String },
    UpdateTitle { title: String },
    AddTimeslot {
        date: String,
        start: String,
        end: String,
    },
    /// Handed to the form reducer
    Form(FormPollAction),
}

impl From<FormPollAction> for PollAction {
    fn from(action: FormPollAction) -> Self {
        PollAction::Form(action)
    }
}

impl PollAction {
    /// Action tag as exchanged with the UI layer
    pub fn name(&self) -> &'static str {
        match self {
            PollAction::ReplacePoll(_) => "REPLACE_POLL",
            PollAction::AddDate { .. } => "ADD_DATE",
            PollAction::RemoveDate { .. } => "REMOVE_DATE",
            PollAction::UpdateTitle { .. } => "UPDATE_TITLE",
            PollAction::AddTimeslot { .. } => "ADD_TIMESLOT",
            PollAction::Form(action) => action.name(),
        }
    }
}

impl FormPollAction {
    pub fn name(&self) -> &'static str {
        match self {
            FormPollAction::ReplacePoll(_) => "REPLACE_POLL",
            FormPollAction::AddQuestion { .. } => "ADD_QUESTION",
            FormPollAction::RemoveQuestion { .. } => "REMOVE_QUESTION",
            FormPollAction::ChangeQuestionType { .. } => "CHANGE_QUESTION_TYPE",
            FormPollAction::AddOption { .. } => "ADD_OPTION",
            FormPollAction::RemoveOption { .. } => "REMOVE_OPTION",
            FormPollAction::SetRequired { .. } => "SET_REQUIRED",
            FormPollAction::RenameQuestion { .. } => "RENAME_QUESTION",
        }
    }
}

/// New state plus the UI hint of the entity that changed.
///
/// When an action does not apply, `state` is the very same `Arc` that was
/// passed in and `hint` is `None`.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub state: Option<Arc<Poll>>,
    pub hint: Option<MutationHint>,
}

impl Reduction {
    pub fn unchanged(state: Option<Arc<Poll>>) -> Self {
        Self { state, hint: None }
    }

    pub(crate) fn applied(poll: Poll, hint: MutationHint) -> Self {
        Self {
            state: Some(Arc::new(poll)),
            hint: Some(hint),
        }
    }

    pub(crate) fn replaced(poll: Poll) -> Self {
        Self {
            state: Some(Arc::new(poll)),
            hint: None,
        }
    }

    /// Whether `state` is still the snapshot `previous` points to
    pub fn is_same_as(&self, previous: &Option<Arc<Poll>>) -> bool {
        match (&self.state, previous) {
            (Some(current), Some(previous)) => Arc::ptr_eq(current, previous),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn into_state(self) -> Option<Arc<Poll>> {
        self.state
    }
}

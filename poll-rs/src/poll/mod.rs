//! Poll document model
//!
//! The aggregate shared by the reducers and by the intent strategies.

pub mod types;

pub use types::*;

use chrono::Utc;
use uuid::Uuid;

/// Fresh identifier for polls, questions and options
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Poll {
    /// Create an empty draft poll of the given type
    pub fn new(poll_type: PollType, title: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: new_id(),
            poll_type,
            title: title.into(),
            description: None,
            status: PollStatus::Draft,
            created_at: now,
            updated_at: now,
            dates: Vec::new(),
            time_slots: Default::default(),
            questions: Vec::new(),
            settings: PollSettings::default(),
        }
    }

    pub fn new_date(title: impl Into<String>) -> Self {
        Self::new(PollType::Date, title)
    }

    pub fn new_form(title: impl Into<String>) -> Self {
        Self::new(PollType::Form, title)
    }

    pub fn is_form(&self) -> bool {
        self.poll_type == PollType::Form
    }

    pub fn question(&self, index: usize) -> Option<&FormQuestion> {
        self.questions.get(index)
    }
}

impl FormOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            label: label.into(),
            is_other: false,
        }
    }

    /// The "Autre" choice backed by a free-text input
    pub fn other() -> Self {
        Self {
            id: new_id(),
            label: OTHER_LABEL.to_string(),
            is_other: true,
        }
    }
}

/// Canonical label of the free-text fallback option
pub const OTHER_LABEL: &str = "Autre";

impl MatrixItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            label: label.into(),
        }
    }
}

impl FormQuestion {
    /// Single-choice question with the given options
    pub fn single(title: impl Into<String>, options: &[&str]) -> Self {
        Self {
            id: new_id(),
            kind: QuestionKind::Single,
            title: title.into(),
            required: false,
            options: Some(options.iter().map(|label| FormOption::new(*label)).collect()),
            max_choices: None,
            matrix_rows: None,
            matrix_columns: None,
            matrix_type: None,
            placeholder: None,
        }
    }

    pub fn text(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            kind: QuestionKind::Text,
            title: title.into(),
            required: false,
            options: None,
            max_choices: None,
            matrix_rows: None,
            matrix_columns: None,
            matrix_type: None,
            placeholder: None,
        }
    }

    pub fn option_count(&self) -> usize {
        self.options.as_ref().map_or(0, Vec::len)
    }

    /// Whether only the fields allowed for `kind` are set
    pub fn is_structurally_valid(&self) -> bool {
        let no_matrix =
            self.matrix_rows.is_none() && self.matrix_columns.is_none() && self.matrix_type.is_none();

        match self.kind {
            QuestionKind::Single => {
                self.option_count() >= 1
                    && self.max_choices.is_none()
                    && no_matrix
                    && self.placeholder.is_none()
            }
            QuestionKind::Multiple => {
                self.option_count() >= 1
                    && self.max_choices.map_or(true, |max| max >= 1 && max <= self.option_count())
                    && no_matrix
                    && self.placeholder.is_none()
            }
            QuestionKind::Text => self.options.is_none() && self.max_choices.is_none() && no_matrix,
            QuestionKind::Matrix => {
                self.options.is_none()
                    && self.max_choices.is_none()
                    && self.matrix_rows.as_ref().is_some_and(|rows| !rows.is_empty())
                    && self.matrix_columns.as_ref().is_some_and(|cols| !cols.is_empty())
                    && self.placeholder.is_none()
            }
        }
    }
}

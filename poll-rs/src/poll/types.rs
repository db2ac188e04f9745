//! Poll document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Poll discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollType {
    Date,
    Form,
    Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    #[default]
    Draft,
    Active,
    Closed,
    Archived,
}

/// Poll aggregate
///
/// Reducers never mutate a `Poll` in place; each applied action yields a new
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    #[serde(rename = "type")]
    pub poll_type: PollType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PollStatus,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
    /// ISO `YYYY-MM-DD` dates, kept sorted (date polls)
    #[serde(default)]
    pub dates: Vec<String>,
    /// Time slots per date (date polls)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub time_slots: BTreeMap<String, Vec<TimeSlot>>,
    /// Questions (form polls only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<FormQuestion>,
    #[serde(default)]
    pub settings: PollSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollSettings {
    pub allow_anonymous: bool,
    pub show_results: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A `start`–`end` range attached to a date, both `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multiple,
    Text,
    Matrix,
}

impl QuestionKind {
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionKind::Single | QuestionKind::Multiple)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixType {
    #[default]
    Single,
    Multiple,
}

/// Choice of a single/multiple question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOption {
    pub id: String,
    pub label: String,
    /// Triggers the free-text fallback input in the UI
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_other: bool,
}

/// Row or column of a matrix question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixItem {
    pub id: String,
    pub label: String,
}

/// Form question
///
/// Which optional fields are set depends on `kind`:
/// options for single/multiple, `max_choices` for multiple only, matrix
/// rows/columns/type for matrix, `placeholder` for text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormQuestion {
    pub id: String,
    pub kind: QuestionKind,
    pub title: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FormOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_rows: Option<Vec<MatrixItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_columns: Option<Vec<MatrixItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_type: Option<MatrixType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// What happened to the highlighted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightType {
    Add,
    Remove,
    Modify,
}

/// Transient UI hint returned next to a reduced poll.
///
/// Never part of the persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationHint {
    /// Id of the question, option or date just touched
    pub highlighted_id: String,
    pub highlight_type: HighlightType,
}

impl MutationHint {
    pub fn new(highlighted_id: impl Into<String>, highlight_type: HighlightType) -> Self {
        Self {
            highlighted_id: highlighted_id.into(),
            highlight_type,
        }
    }
}

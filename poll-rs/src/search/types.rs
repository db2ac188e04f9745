//! Search types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chat conversation as supplied by the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub first_message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ConversationStatus,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    /// Last activity; older histories may not carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_poll_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Completed,
    Archived,
}

/// Status criterion; `All` disables the check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Active,
    Completed,
    Archived,
}

impl StatusFilter {
    pub fn matches(&self, status: ConversationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ConversationStatus::Active,
            StatusFilter::Completed => status == ConversationStatus::Completed,
            StatusFilter::Archived => status == ConversationStatus::Archived,
        }
    }
}

/// Inclusive creation date bounds, each optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

/// Search criteria; unset fields do not constrain the result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Every tag must be found (substring, case-insensitive) among the conversation tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_related_poll: Option<bool>,
}

impl SearchFilters {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Number of criteria that are set, the query included
    pub fn active_count(&self) -> usize {
        [
            !self.query.is_empty(),
            self.status.is_some(),
            self.is_favorite.is_some(),
            self.date_range.is_some(),
            !self.tags.is_empty(),
            self.has_related_poll.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Non-empty queries shorter than this (in characters) yield nothing
    pub min_query_length: usize,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            case_sensitive: false,
        }
    }
}

/// Field a highlight was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightField {
    Title,
    /// The conversation's first message
    Content,
    /// Tags joined with ", "
    Tags,
}

/// One match inside a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHighlight {
    pub field: HighlightField,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
    /// Matched text
    pub text: String,
    /// Up to 20 characters on each side of the match
    pub context: String,
}

/// Search output bound by the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub conversations: Vec<Conversation>,
    pub total_count: usize,
    pub query: String,
    pub filters: SearchFilters,
    /// Conversation id to its highlights
    pub highlights: HashMap<String, Vec<SearchHighlight>>,
    pub is_loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn empty(query: String, filters: SearchFilters) -> Self {
        Self {
            query,
            filters,
            ..Default::default()
        }
    }

    pub fn failed(query: String, filters: SearchFilters, error: String) -> Self {
        Self {
            query,
            filters,
            error: Some(error),
            ..Default::default()
        }
    }
}

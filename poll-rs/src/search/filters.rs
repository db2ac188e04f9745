//! Structured filtering pass

use super::types::{Conversation, SearchFilters};
use crate::error::{PollError, Result};

/// Keep the conversations satisfying every set criterion
pub fn apply_filters<'a>(
    conversations: &'a [Conversation],
    filters: &SearchFilters,
) -> Result<Vec<&'a Conversation>> {
    if let Some(range) = &filters.date_range {
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(PollError::Search(format!(
                    "date range starts after it ends ({} > {})",
                    from, to
                )));
            }
        }
    }

    let wanted_tags: Vec<String> = filters.tags.iter().map(|t| t.to_lowercase()).collect();

    Ok(conversations
        .iter()
        .filter(|conversation| matches(conversation, filters, &wanted_tags))
        .collect())
}

fn matches(conversation: &Conversation, filters: &SearchFilters, wanted_tags: &[String]) -> bool {
    if let Some(status) = filters.status {
        if !status.matches(conversation.status) {
            return false;
        }
    }

    if let Some(favorite) = filters.is_favorite {
        if conversation.is_favorite != favorite {
            return false;
        }
    }

    if let Some(range) = &filters.date_range {
        if range.from.is_some_and(|from| conversation.created_at < from) {
            return false;
        }
        if range.to.is_some_and(|to| conversation.created_at > to) {
            return false;
        }
    }

    if !wanted_tags.is_empty() {
        let tags: Vec<String> = conversation.tags.iter().map(|t| t.to_lowercase()).collect();
        let all_found = wanted_tags
            .iter()
            .all(|wanted| tags.iter().any(|tag| tag.contains(wanted.as_str())));
        if !all_found {
            return false;
        }
    }

    if let Some(has_poll) = filters.has_related_poll {
        if conversation.related_poll_id.is_some() != has_poll {
            return false;
        }
    }

    true
}

//! Date poll reducer

use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::form::form_poll_reducer;
use super::types::{PollAction, Reduction};
use crate::poll::{HighlightType, MutationHint, Poll, PollType, TimeSlot};

/// Apply a poll action.
///
/// Date operations only apply to date polls, `UpdateTitle` to any poll,
/// and form actions are handed to [`form_poll_reducer`].
pub fn poll_reducer(state: Option<Arc<Poll>>, action: PollAction) -> Reduction {
    let action = match action {
        PollAction::ReplacePoll(poll) => return Reduction::replaced(poll),
        PollAction::Form(form_action) => return form_poll_reducer(state, form_action),
        other => other,
    };

    let mut next = match state.as_deref() {
        Some(poll) if applies_to(&action, poll.poll_type) => poll.clone(),
        _ => {
            debug!("{} ignored: not applicable to current poll", action.name());
            return Reduction::unchanged(state);
        }
    };

    match apply(&mut next, &action) {
        Some(hint) => {
            next.updated_at = Utc::now();
            Reduction::applied(next, hint)
        }
        None => {
            debug!("{} rejected, state unchanged", action.name());
            Reduction::unchanged(state)
        }
    }
}

fn applies_to(action: &PollAction, poll_type: PollType) -> bool {
    match action {
        PollAction::UpdateTitle { .. } => true,
        PollAction::AddDate { .. } | PollAction::RemoveDate { .. } | PollAction::AddTimeslot { .. } => {
            poll_type == PollType::Date
        }
        PollAction::ReplacePoll(_) | PollAction::Form(_) => false,
    }
}

fn apply(poll: &mut Poll, action: &PollAction) -> Option<MutationHint> {
    match action {
        PollAction::AddDate { date } => {
            let date = parse_date(date)?;
            if poll.dates.contains(&date) {
                return None;
            }
            poll.dates.push(date.clone());
            poll.dates.sort();
            Some(MutationHint::new(date, HighlightType::Add))
        }
        PollAction::RemoveDate { date } => {
            let date = parse_date(date)?;
            let index = poll.dates.iter().position(|d| *d == date)?;
            poll.dates.remove(index);
            poll.time_slots.remove(&date);
            Some(MutationHint::new(date, HighlightType::Remove))
        }
        PollAction::UpdateTitle { title } => {
            let title = title.trim();
            if title.is_empty() || poll.title == title {
                return None;
            }
            poll.title = title.to_string();
            Some(MutationHint::new(poll.id.clone(), HighlightType::Modify))
        }
        PollAction::AddTimeslot { date, start, end } => {
            let date = parse_date(date)?;
            if !poll.dates.contains(&date) {
                return None;
            }

            let start_time = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
            let end_time = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
            if start_time >= end_time {
                return None;
            }

            let slot = TimeSlot {
                start: start_time.format("%H:%M").to_string(),
                end: end_time.format("%H:%M").to_string(),
            };

            let slots = poll.time_slots.entry(date.clone()).or_default();
            if slots.contains(&slot) {
                return None;
            }
            slots.push(slot);
            slots.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

            Some(MutationHint::new(date, HighlightType::Modify))
        }
        PollAction::ReplacePoll(_) | PollAction::Form(_) => None,
    }
}

/// Canonical `YYYY-MM-DD` form of a date, if valid
fn parse_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

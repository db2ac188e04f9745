//! Date poll commands: dates, time slots and the poll title

use async_trait::async_trait;
use chrono::NaiveTime;
use poll_rs::reducer::PollAction;
use poll_rs::{Poll, PollType};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{detect_title, find_date, has_add_verb, has_remove_verb, REGEX_CONFIDENCE};
use crate::intent::strategy::IntentDetectionStrategy;
use crate::intent::types::{IntentResult, ModifiedField, StrategyKind};

/// `10h-11h`, `10:00 - 11:30`, `de 9h30 à 12h`, `14h to 16h`
static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<sh>\d{1,2})\s*[h:]\s*(?P<sm>\d{2})?\s*(?:-|–|à|to)\s*(?P<eh>\d{1,2})(?:\s*[h:]\s*(?P<em>\d{2})?)?",
    )
    .expect("TIME_RANGE: hardcoded regex is valid")
});

/// Adds and removes dates and time slots on date polls
#[derive(Debug, Default)]
pub struct DatePollStrategy;

impl DatePollStrategy {
    pub const NAME: &'static str = "date-poll";

    pub fn new() -> Self {
        Self
    }

    fn detect_timeslot(&self, message: &str, poll: &Poll) -> Option<IntentResult> {
        let caps = TIME_RANGE.captures(message)?;
        let start = clock(&caps["sh"], caps.name("sm").map(|m| m.as_str()))?;
        let end = clock(&caps["eh"], caps.name("em").map(|m| m.as_str()))?;

        // Without an explicit date, a poll with a single date is unambiguous
        let date = match find_date(message) {
            Some(date) => date,
            None if poll.dates.len() == 1 => poll.dates[0].clone(),
            None => {
                debug!("Time range found but no date to attach it to");
                return None;
            }
        };

        let explanation = format!("Ajout du créneau {}-{} le {}", start, end, date);
        Some(
            IntentResult::modification(
                PollAction::AddTimeslot { date, start, end },
                REGEX_CONFIDENCE,
                ModifiedField::TimeSlots,
                StrategyKind::Regex,
            )
            .with_explanation(explanation),
        )
    }

    fn detect_date(&self, message: &str) -> Option<IntentResult> {
        let date = find_date(message)?;

        let (action, explanation) = if has_remove_verb(message) {
            let explanation = format!("Suppression de la date {}", date);
            (PollAction::RemoveDate { date }, explanation)
        } else if has_add_verb(message) {
            let explanation = format!("Ajout de la date {}", date);
            (PollAction::AddDate { date }, explanation)
        } else {
            return None;
        };

        Some(
            IntentResult::modification(action, 0.95, ModifiedField::Dates, StrategyKind::Regex)
                .with_explanation(explanation),
        )
    }
}

/// `HH:MM` from an hour and optional minutes
fn clock(hour: &str, minutes: Option<&str>) -> Option<String> {
    let hour: u32 = hour.parse().ok()?;
    let minutes: u32 = minutes.map_or(Some(0), |m| m.parse().ok())?;
    let time = NaiveTime::from_hms_opt(hour, minutes, 0)?;
    Some(time.format("%H:%M").to_string())
}

#[async_trait]
impl IntentDetectionStrategy for DatePollStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Regex
    }

    fn can_handle(&self, poll_type: PollType) -> bool {
        poll_type == PollType::Date
    }

    async fn detect(&self, message: &str, poll: &Poll) -> anyhow::Result<Option<IntentResult>> {
        if let Some(result) = detect_title(message) {
            return Ok(Some(result));
        }

        if !has_remove_verb(message) {
            if let Some(result) = self.detect_timeslot(message, poll) {
                return Ok(Some(result));
            }
        }

        Ok(self.detect_date(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_with_dates(dates: &[&str]) -> Poll {
        let mut poll = Poll::new_date("Dîner");
        poll.dates = dates.iter().map(|d| d.to_string()).collect();
        poll
    }

    async fn action(message: &str, poll: &Poll) -> Option<PollAction> {
        DatePollStrategy::new()
            .detect(message, poll)
            .await
            .unwrap()
            .and_then(|result| result.action)
    }

    #[tokio::test]
    async fn test_add_and_remove_date() {
        let poll = poll_with_dates(&[]);

        assert_eq!(
            action("Ajoute le 12/06/2025", &poll).await,
            Some(PollAction::AddDate { date: "2025-06-12".into() })
        );
        assert_eq!(
            action("please add 2025-06-13", &poll).await,
            Some(PollAction::AddDate { date: "2025-06-13".into() })
        );
        assert_eq!(
            action("Supprime le 14 juin 2025", &poll).await,
            Some(PollAction::RemoveDate { date: "2025-06-14".into() })
        );
    }

    #[tokio::test]
    async fn test_timeslot_formats() {
        let poll = poll_with_dates(&["2025-06-12", "2025-06-13"]);

        assert_eq!(
            action("Ajoute un créneau 10h-11h le 12/06/2025", &poll).await,
            Some(PollAction::AddTimeslot {
                date: "2025-06-12".into(),
                start: "10:00".into(),
                end: "11:00".into(),
            })
        );
        assert_eq!(
            action("add 9:30 - 11:45 on 2025-06-13", &poll).await,
            Some(PollAction::AddTimeslot {
                date: "2025-06-13".into(),
                start: "09:30".into(),
                end: "11:45".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_timeslot_uses_single_existing_date() {
        let poll = poll_with_dates(&["2025-06-12"]);
        assert_eq!(
            action("de 14h à 16h30 aussi", &poll).await,
            Some(PollAction::AddTimeslot {
                date: "2025-06-12".into(),
                start: "14:00".into(),
                end: "16:30".into(),
            })
        );

        let ambiguous = poll_with_dates(&["2025-06-12", "2025-06-13"]);
        assert_eq!(action("de 14h à 16h30 aussi", &ambiguous).await, None);
    }

    #[tokio::test]
    async fn test_invalid_clock_ignored() {
        let poll = poll_with_dates(&["2025-06-12"]);
        assert_eq!(action("ajoute 25h-26h", &poll).await, None);
    }

    #[tokio::test]
    async fn test_title_and_unrelated() {
        let poll = poll_with_dates(&[]);
        assert_eq!(
            action("renomme le sondage en Pot de départ", &poll).await,
            Some(PollAction::UpdateTitle { title: "Pot de départ".into() })
        );
        assert_eq!(action("Bonjour, ça va ?", &poll).await, None);
        assert_eq!(action("Le 12/06/2025 me va", &poll).await, None);
    }

    #[tokio::test]
    async fn test_result_metadata() {
        let poll = poll_with_dates(&[]);
        let result = DatePollStrategy::new()
            .detect("ajoute le 2025-06-12", &poll)
            .await
            .unwrap()
            .unwrap();

        assert!(result.is_modification);
        assert_eq!(result.strategy, StrategyKind::Regex);
        assert_eq!(result.modified_field, Some(ModifiedField::Dates));
        assert!(result.explanation.unwrap().contains("2025-06-12"));
    }

    #[test]
    fn test_can_handle() {
        let strategy = DatePollStrategy::new();
        assert!(strategy.can_handle(PollType::Date));
        assert!(!strategy.can_handle(PollType::Form));
    }
}

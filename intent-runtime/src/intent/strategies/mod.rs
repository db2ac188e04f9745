//! Built-in detection strategies
//!
//! The regex strategies understand short French and English editing
//! commands. Everything they share (verbs, dates, question references)
//! lives here.

pub mod ai;
pub mod date;
pub mod option;
pub mod question;

pub use ai::AiStrategy;
pub use date::DatePollStrategy;
pub use option::FormOptionStrategy;
pub use question::FormQuestionStrategy;

use chrono::NaiveDate;
use poll_rs::reducer::PollAction;
use poll_rs::Poll;
use regex::Regex;
use std::sync::LazyLock;

use super::types::{IntentResult, ModifiedField, StrategyKind};

/// Confidence reported by the regex strategies
pub const REGEX_CONFIDENCE: f32 = 0.9;

static ADD_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ajoute[rz]?|ajout|rajoute[rz]?|mets|mettre|propose[rz]?|add|include|put)\b")
        .expect("ADD_VERB: hardcoded regex is valid")
});

static REMOVE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:supprime[rz]?|retire[rz]?|enl[eè]ve[rz]?|efface[rz]?|enlever|remove|delete|drop)\b")
        .expect("REMOVE_VERB: hardcoded regex is valid")
});

/// `2025-06-01`, `01/06/2025` or `1 juin 2025`
static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?P<iy>\d{4})-(?P<im>\d{1,2})-(?P<id>\d{1,2})|(?P<fd>\d{1,2})/(?P<fm>\d{1,2})/(?P<fy>\d{4})|(?P<nd>\d{1,2})(?:er)?\s+(?P<nm>janvier|f[ée]vrier|mars|avril|mai|juin|juillet|ao[uû]t|septembre|octobre|novembre|d[ée]cembre)\s+(?P<ny>\d{4}))\b",
    )
    .expect("DATE_TOKEN: hardcoded regex is valid")
});

/// `question 2`, `question n°2`, `Q2`
static QUESTION_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:question|q)\s*(?:n[°o]\.?\s*|#\s*)?(\d{1,3})\b")
        .expect("QUESTION_NUMBER: hardcoded regex is valid")
});

/// `la deuxième question`, `the 2nd question`, `la dernière question`
static QUESTION_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}\s*(?:ère|ere|er|ème|eme|e|st|nd|rd|th)|\p{L}+)\s+question\b")
        .expect("QUESTION_ORDINAL: hardcoded regex is valid")
});

static POLL_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:\b(?:renomme[rz]?|rename)\b(?:\s+(?:le\s+|the\s+)?(?:sondage|poll))?|\b(?:change[rz]?|modifie[rz]?|set)\s+(?:le\s+|the\s+)?(?:titre|title)(?:\s+(?:du\s+sondage|of\s+the\s+poll))?)\s+(?:en|to|as|par|:)\s*["«“]?\s*(?P<title>.+?)\s*["»”]?\s*[.!]?\s*$"#,
    )
    .expect("POLL_TITLE: hardcoded regex is valid")
});

pub(crate) fn has_add_verb(message: &str) -> bool {
    ADD_VERB.is_match(message)
}

pub(crate) fn has_remove_verb(message: &str) -> bool {
    REMOVE_VERB.is_match(message)
}

/// First date mentioned in `message`, as `YYYY-MM-DD`
pub(crate) fn find_date(message: &str) -> Option<String> {
    let caps = DATE_TOKEN.captures(message)?;

    let (year, month, day): (&str, u32, &str) = if let Some(year) = caps.name("iy") {
        (year.as_str(), caps["im"].parse().ok()?, &caps["id"])
    } else if let Some(year) = caps.name("fy") {
        (year.as_str(), caps["fm"].parse().ok()?, &caps["fd"])
    } else {
        (&caps["ny"], month_number(&caps["nm"])?, &caps["nd"])
    };

    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "janvier" => 1,
        "février" | "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "août" | "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "décembre" | "decembre" => 12,
        _ => return None,
    };
    Some(month)
}

/// Zero-based index of the question `message` refers to
pub(crate) fn find_question_index(message: &str, question_count: usize) -> Option<usize> {
    if let Some(caps) = QUESTION_NUMBER.captures(message) {
        let number: usize = caps[1].parse().ok()?;
        return number.checked_sub(1);
    }

    QUESTION_ORDINAL
        .captures_iter(message)
        .find_map(|caps| ordinal_position(&caps[1], question_count))
        .and_then(|position| position.checked_sub(1))
}

/// One-based position named by an ordinal word
fn ordinal_position(word: &str, question_count: usize) -> Option<usize> {
    let word = word.to_lowercase();

    let digits: String = word.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }

    let position = match word.as_str() {
        "première" | "premiere" | "premier" | "first" => 1,
        "deuxième" | "deuxieme" | "seconde" | "second" => 2,
        "troisième" | "troisieme" | "third" => 3,
        "quatrième" | "quatrieme" | "fourth" => 4,
        "cinquième" | "cinquieme" | "fifth" => 5,
        "sixième" | "sixieme" | "sixth" => 6,
        "septième" | "septieme" | "seventh" => 7,
        "huitième" | "huitieme" | "eighth" => 8,
        "neuvième" | "neuvieme" | "ninth" => 9,
        "dixième" | "dixieme" | "tenth" => 10,
        "dernière" | "derniere" | "dernier" | "last" => {
            if question_count == 0 {
                return None;
            }
            question_count
        }
        _ => return None,
    };
    Some(position)
}

/// Id of the question at `index`, when it exists
pub(crate) fn question_id(poll: &Poll, index: usize) -> Option<String> {
    poll.question(index).map(|question| question.id.clone())
}

/// `UPDATE_TITLE` from "renomme le sondage en ..." / "rename the poll to ..."
pub(crate) fn detect_title(message: &str) -> Option<IntentResult> {
    let caps = POLL_TITLE.captures(message.trim())?;
    let title = caps["title"].trim();
    if title.is_empty() {
        return None;
    }

    Some(
        IntentResult::modification(
            PollAction::UpdateTitle { title: title.to_string() },
            REGEX_CONFIDENCE,
            ModifiedField::Title,
            StrategyKind::Regex,
        )
        .with_explanation(format!("Rename the poll to \"{}\"", title)),
    )
}

/// Uppercase the first character
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Form poll reducer

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::types::{FormPollAction, Reduction};
use crate::poll::{
    FormOption, FormQuestion, HighlightType, MatrixItem, MatrixType, MutationHint, Poll,
    QuestionKind, OTHER_LABEL,
};

/// Options seeded on a new question
const DEFAULT_ANSWERS: [&str; 2] = ["Oui", "Non"];
/// Options synthesised when a question becomes single/multiple without any
const DEFAULT_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];
const DEFAULT_MATRIX_ROWS: [&str; 2] = ["Ligne 1", "Ligne 2"];
const DEFAULT_MATRIX_COLUMNS: [&str; 3] = ["Pas du tout", "Moyennement", "Tout à fait"];

/// Apply a form action.
///
/// `ReplacePoll` always applies. Everything else requires a form poll and
/// otherwise returns `state` untouched.
pub fn form_poll_reducer(state: Option<Arc<Poll>>, action: FormPollAction) -> Reduction {
    if let FormPollAction::ReplacePoll(poll) = action {
        return Reduction::replaced(poll);
    }

    let mut next = match state.as_deref() {
        Some(poll) if poll.is_form() => poll.clone(),
        _ => {
            debug!("{} ignored: no form poll selected", action.name());
            return Reduction::unchanged(state);
        }
    };

    match apply(&mut next, &action) {
        Some(hint) => {
            next.updated_at = Utc::now();
            Reduction::applied(next, hint)
        }
        None => {
            debug!("{} not applicable, state unchanged", action.name());
            Reduction::unchanged(state)
        }
    }
}

fn apply(poll: &mut Poll, action: &FormPollAction) -> Option<MutationHint> {
    match action {
        FormPollAction::ReplacePoll(_) => None,
        FormPollAction::AddQuestion { subject } => add_question(poll, subject),
        FormPollAction::RemoveQuestion { question_index } => {
            if *question_index >= poll.questions.len() {
                return None;
            }
            let removed = poll.questions.remove(*question_index);
            Some(MutationHint::new(removed.id, HighlightType::Remove))
        }
        FormPollAction::ChangeQuestionType {
            question_index,
            new_type,
        } => {
            let question = poll.questions.get_mut(*question_index)?;
            if question.kind == *new_type {
                return None;
            }
            convert_question(question, *new_type);
            Some(MutationHint::new(question.id.clone(), HighlightType::Modify))
        }
        FormPollAction::AddOption {
            question_index,
            option_text,
        } => add_option(poll.questions.get_mut(*question_index)?, option_text),
        FormPollAction::RemoveOption {
            question_index,
            option_text,
        } => remove_option(poll.questions.get_mut(*question_index)?, option_text),
        FormPollAction::SetRequired {
            question_index,
            required,
        } => {
            let question = poll.questions.get_mut(*question_index)?;
            if question.required == *required {
                return None;
            }
            question.required = *required;
            Some(MutationHint::new(question.id.clone(), HighlightType::Modify))
        }
        FormPollAction::RenameQuestion {
            question_index,
            new_title,
        } => {
            let title = new_title.trim();
            if title.is_empty() {
                return None;
            }
            let question = poll.questions.get_mut(*question_index)?;
            if question.title == title {
                return None;
            }
            question.title = title.to_string();
            Some(MutationHint::new(question.id.clone(), HighlightType::Modify))
        }
    }
}

fn add_question(poll: &mut Poll, subject: &str) -> Option<MutationHint> {
    let subject = subject.trim();
    if subject.is_empty() {
        return None;
    }

    let question = FormQuestion::single(subject, &DEFAULT_ANSWERS);
    let hint = MutationHint::new(question.id.clone(), HighlightType::Add);
    poll.questions.push(question);

    Some(hint)
}

/// Whether `text` asks for the free-text fallback choice
pub fn is_other_label(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("autre") || text.eq_ignore_ascii_case("other")
}

fn add_option(question: &mut FormQuestion, option_text: &str) -> Option<MutationHint> {
    if !question.kind.has_options() {
        return None;
    }

    let text = option_text.trim();
    if text.is_empty() {
        return None;
    }

    let options = question.options.get_or_insert_with(Vec::new);

    let option = if is_other_label(text) {
        if options.iter().any(|o| o.is_other) {
            return None;
        }
        FormOption::other()
    } else {
        if options.iter().any(|o| o.label.to_lowercase() == text.to_lowercase()) {
            return None;
        }
        FormOption::new(text)
    };

    let hint = MutationHint::new(option.id.clone(), HighlightType::Add);

    // "Autre" stays the last choice
    match options.iter().position(|o| o.is_other) {
        Some(other_index) if !option.is_other => options.insert(other_index, option),
        _ => options.push(option),
    }

    Some(hint)
}

fn remove_option(question: &mut FormQuestion, option_text: &str) -> Option<MutationHint> {
    let wanted = option_text.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let options = question.options.as_mut()?;
    let index = options
        .iter()
        .position(|o| o.label.to_lowercase() == wanted || (o.is_other && is_other_label(&wanted)))?;
    // A choice question keeps at least one option
    if options.len() <= 1 {
        debug!("Refusing to remove the last option of question {}", question.id);
        return None;
    }
    let removed = options.remove(index);
    let remaining = options.len();

    if let Some(max) = question.max_choices {
        question.max_choices = Some(max.min(remaining));
    }

    Some(MutationHint::new(removed.id, HighlightType::Remove))
}

/// Reshape a question so it is structurally valid for `kind`
pub fn convert_question(question: &mut FormQuestion, kind: QuestionKind) {
    match kind {
        QuestionKind::Text => {
            question.options = None;
            question.max_choices = None;
            clear_matrix(question);
        }
        QuestionKind::Matrix => {
            let rows: Vec<MatrixItem> = match (&question.options, &question.matrix_rows) {
                (Some(options), _) => options
                    .iter()
                    .filter(|o| !o.is_other)
                    .map(|o| MatrixItem::new(o.label.clone()))
                    .collect(),
                (None, Some(rows)) => rows.clone(),
                (None, None) => Vec::new(),
            };

            question.matrix_rows = Some(if rows.is_empty() {
                DEFAULT_MATRIX_ROWS.iter().map(|l| MatrixItem::new(*l)).collect()
            } else {
                rows
            });
            if question.matrix_columns.as_ref().map_or(true, Vec::is_empty) {
                question.matrix_columns =
                    Some(DEFAULT_MATRIX_COLUMNS.iter().map(|l| MatrixItem::new(*l)).collect());
            }
            question.matrix_type.get_or_insert(MatrixType::Single);
            question.options = None;
            question.max_choices = None;
            question.placeholder = None;
        }
        QuestionKind::Single | QuestionKind::Multiple => {
            let mut options = question.options.take().unwrap_or_default();
            if options.is_empty() {
                if let Some(rows) = &question.matrix_rows {
                    options = rows.iter().map(|r| FormOption::new(r.label.clone())).collect();
                }
            }
            if options.is_empty() {
                options = DEFAULT_OPTIONS.iter().map(|l| FormOption::new(*l)).collect();
            }

            question.max_choices = match kind {
                QuestionKind::Multiple => Some(options.len()),
                _ => None,
            };
            question.options = Some(options);
            question.placeholder = None;
            clear_matrix(question);
        }
    }

    question.kind = kind;
}

fn clear_matrix(question: &mut FormQuestion) {
    question.matrix_rows = None;
    question.matrix_columns = None;
    question.matrix_type = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_question() -> Option<Arc<Poll>> {
        let mut poll = Poll::new_form("Feedback");
        poll.questions.push(FormQuestion::single("Satisfied?", &["Yes", "No"]));
        Some(Arc::new(poll))
    }

    fn reduce(state: &Option<Arc<Poll>>, action: FormPollAction) -> Reduction {
        form_poll_reducer(state.clone(), action)
    }

    #[test]
    fn test_null_state_is_noop() {
        let reduction = form_poll_reducer(None, FormPollAction::AddQuestion { subject: "Q".into() });
        assert!(reduction.state.is_none());
        assert!(reduction.hint.is_none());
    }

    #[test]
    fn test_non_form_poll_is_noop() {
        let state = Some(Arc::new(Poll::new_date("Dinner")));
        let reduction = reduce(&state, FormPollAction::AddQuestion { subject: "Q".into() });
        assert!(reduction.is_same_as(&state));
    }

    #[test]
    fn test_add_question_seeds_yes_no() {
        let state = Some(Arc::new(Poll::new_form("Feedback")));
        let reduction = reduce(&state, FormPollAction::AddQuestion { subject: " Menu " .into() });

        let poll = reduction.state.unwrap();
        let question = &poll.questions[0];
        assert_eq!(question.title, "Menu");
        assert_eq!(question.kind, QuestionKind::Single);
        let labels: Vec<_> = question.options.as_ref().unwrap().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Oui", "Non"]);

        let hint = reduction.hint.unwrap();
        assert_eq!(hint.highlighted_id, question.id);
        assert_eq!(hint.highlight_type, HighlightType::Add);
    }

    #[test]
    fn test_remove_question_out_of_range() {
        let state = form_with_question();
        let reduction = reduce(&state, FormPollAction::RemoveQuestion { question_index: 3 });
        assert!(reduction.is_same_as(&state));
    }

    #[test]
    fn test_remove_question() {
        let state = form_with_question();
        let removed_id = state.as_ref().unwrap().questions[0].id.clone();
        let reduction = reduce(&state, FormPollAction::RemoveQuestion { question_index: 0 });

        assert!(reduction.state.as_ref().unwrap().questions.is_empty());
        let hint = reduction.hint.unwrap();
        assert_eq!(hint.highlighted_id, removed_id);
        assert_eq!(hint.highlight_type, HighlightType::Remove);
    }

    #[test]
    fn test_convert_to_text_strips_options() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Multiple },
        );
        let reduction = form_poll_reducer(
            reduction.state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Text },
        );

        let question = &reduction.state.as_ref().unwrap().questions[0];
        assert_eq!(question.kind, QuestionKind::Text);
        assert!(question.options.is_none());
        assert!(question.max_choices.is_none());
        assert!(question.is_structurally_valid());
    }

    #[test]
    fn test_convert_to_matrix_uses_options_as_rows() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Matrix },
        );

        let question = &reduction.state.as_ref().unwrap().questions[0];
        let rows: Vec<_> = question.matrix_rows.as_ref().unwrap().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(rows, vec!["Yes", "No"]);
        assert_eq!(question.matrix_columns.as_ref().unwrap().len(), 3);
        assert_eq!(question.matrix_type, Some(MatrixType::Single));
        assert!(question.options.is_none());
        assert!(question.is_structurally_valid());
    }

    #[test]
    fn test_convert_text_to_single_synthesises_options() {
        let mut poll = Poll::new_form("Feedback");
        poll.questions.push(FormQuestion::text("Comments"));
        let state = Some(Arc::new(poll));

        let reduction = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Single },
        );
        let question = &reduction.state.as_ref().unwrap().questions[0];
        assert_eq!(question.option_count(), 2);
        assert!(question.is_structurally_valid());
    }

    #[test]
    fn test_convert_matrix_back_to_multiple_uses_rows() {
        let state = form_with_question();
        let matrix = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Matrix },
        );
        let multiple = form_poll_reducer(
            matrix.state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Multiple },
        );

        let question = &multiple.state.as_ref().unwrap().questions[0];
        let labels: Vec<_> = question.options.as_ref().unwrap().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No"]);
        assert_eq!(question.max_choices, Some(2));
        assert!(question.matrix_rows.is_none());
    }

    #[test]
    fn test_same_type_is_noop() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Single },
        );
        assert!(reduction.is_same_as(&state));
    }

    #[test]
    fn test_add_other_option_normalised() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::AddOption { question_index: 0, option_text: "autre".into() },
        );

        let options = reduction.state.as_ref().unwrap().questions[0].options.clone().unwrap();
        let other = options.last().unwrap();
        assert_eq!(other.label, "Autre");
        assert!(other.is_other);
        assert_eq!(reduction.hint.unwrap().highlighted_id, other.id);

        // A second "other" is refused
        let again = form_poll_reducer(
            reduction.state.clone(),
            FormPollAction::AddOption { question_index: 0, option_text: "OTHER".into() },
        );
        assert!(again.is_same_as(&reduction.state));
    }

    #[test]
    fn test_regular_option_inserted_before_other() {
        let state = form_with_question();
        let with_other = reduce(
            &state,
            FormPollAction::AddOption { question_index: 0, option_text: "Other".into() },
        );
        let with_maybe = form_poll_reducer(
            with_other.state,
            FormPollAction::AddOption { question_index: 0, option_text: "Maybe".into() },
        );

        let labels: Vec<_> = with_maybe.state.as_ref().unwrap().questions[0]
            .options
            .as_ref()
            .unwrap()
            .iter()
            .map(|o| o.label.clone())
            .collect();
        assert_eq!(labels, vec!["Yes", "No", "Maybe", "Autre"]);
    }

    #[test]
    fn test_add_option_on_text_is_noop() {
        let mut poll = Poll::new_form("Feedback");
        poll.questions.push(FormQuestion::text("Comments"));
        let state = Some(Arc::new(poll));

        let reduction = reduce(
            &state,
            FormPollAction::AddOption { question_index: 0, option_text: "Maybe".into() },
        );
        assert!(reduction.is_same_as(&state));
    }

    #[test]
    fn test_remove_option_clamps_max_choices() {
        let state = form_with_question();
        let multiple = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Multiple },
        );
        let reduction = form_poll_reducer(
            multiple.state,
            FormPollAction::RemoveOption { question_index: 0, option_text: "yes".into() },
        );

        let question = &reduction.state.as_ref().unwrap().questions[0];
        assert_eq!(question.option_count(), 1);
        assert_eq!(question.max_choices, Some(1));
        assert_eq!(reduction.hint.unwrap().highlight_type, HighlightType::Remove);
    }

    #[test]
    fn test_last_option_is_kept() {
        let state = form_with_question();
        let multiple = reduce(
            &state,
            FormPollAction::ChangeQuestionType { question_index: 0, new_type: QuestionKind::Multiple },
        );
        let one_left = form_poll_reducer(
            multiple.state,
            FormPollAction::RemoveOption { question_index: 0, option_text: "Yes".into() },
        );
        let reduction = reduce(
            &one_left.state,
            FormPollAction::RemoveOption { question_index: 0, option_text: "No".into() },
        );

        assert!(reduction.is_same_as(&one_left.state));
        assert!(reduction.hint.is_none());
        let question = &reduction.state.as_ref().unwrap().questions[0];
        assert_eq!(question.option_count(), 1);
        assert_eq!(question.max_choices, Some(1));
        assert!(question.is_structurally_valid());
    }

    #[test]
    fn test_remove_unknown_option_is_noop() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::RemoveOption { question_index: 0, option_text: "Maybe".into() },
        );
        assert!(reduction.is_same_as(&state));
    }

    #[test]
    fn test_set_required() {
        let state = form_with_question();
        let reduction = reduce(&state, FormPollAction::SetRequired { question_index: 0, required: true });
        assert!(reduction.state.as_ref().unwrap().questions[0].required);

        let unchanged = form_poll_reducer(
            reduction.state.clone(),
            FormPollAction::SetRequired { question_index: 0, required: true },
        );
        assert!(unchanged.is_same_as(&reduction.state));
    }

    #[test]
    fn test_rename_blank_is_noop() {
        let state = form_with_question();
        let reduction = reduce(
            &state,
            FormPollAction::RenameQuestion { question_index: 0, new_title: "   ".into() },
        );
        assert!(reduction.is_same_as(&state));

        let renamed = reduce(
            &state,
            FormPollAction::RenameQuestion { question_index: 0, new_title: " Happy? ".into() },
        );
        assert_eq!(renamed.state.as_ref().unwrap().questions[0].title, "Happy?");
    }

    #[test]
    fn test_applied_action_stamps_updated_at() {
        let state = form_with_question();
        let before = state.as_ref().unwrap().updated_at;
        let reduction = reduce(&state, FormPollAction::SetRequired { question_index: 0, required: true });
        assert!(reduction.state.as_ref().unwrap().updated_at >= before);
        // Input snapshot untouched
        assert!(!state.as_ref().unwrap().questions[0].required);
    }

    #[test]
    fn test_replace_poll_from_null() {
        let poll = Poll::new_form("Loaded");
        let reduction = form_poll_reducer(None, FormPollAction::ReplacePoll(poll.clone()));
        assert_eq!(reduction.state.as_deref(), Some(&poll));
        assert!(reduction.hint.is_none());
    }
}

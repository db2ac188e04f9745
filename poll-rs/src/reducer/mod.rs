//! Poll mutation reducers
//!
//! Pure functions `(state, action) -> Reduction`. Inapplicable actions hand
//! the input snapshot back unchanged instead of failing.

pub mod date;
pub mod form;
pub mod types;

pub use date::poll_reducer;
pub use form::{convert_question, form_poll_reducer, is_other_label};
pub use types::{FormPollAction, PollAction, Reduction};

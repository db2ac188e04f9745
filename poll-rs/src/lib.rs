//! poll-rs: poll document core
//!
//! The state side of the chat-to-poll editing experience.
//!
//! # Features
//!
//! - **Poll model**: date, form and availability polls with typed questions
//! - **Reducers**: pure `(state, action) -> new state` transitions with UI hints
//! - **Conversation search**: structured filters, literal highlighting, cached results
//! - **Cache**: bounded LRU/FIFO cache with TTL and pattern invalidation
//!
//! # Example
//!
//! ```
//! use poll_rs::poll::{Poll, QuestionKind};
//! use poll_rs::reducer::{form_poll_reducer, FormPollAction};
//! use std::sync::Arc;
//!
//! let state = Some(Arc::new(Poll::new_form("Feedback")));
//! let reduction = form_poll_reducer(
//!     state,
//!     FormPollAction::AddQuestion { subject: "Menu".to_string() },
//! );
//!
//! let poll = reduction.state.unwrap();
//! assert_eq!(poll.questions[0].kind, QuestionKind::Single);
//! assert!(reduction.hint.is_some());
//! ```
//!
//! # Modules
//!
//! - [`cache`]: bounded caches
//! - [`config`]: configuration management
//! - [`error`]: error types
//! - [`logging`]: tracing subscriber setup
//! - [`poll`]: document model
//! - [`reducer`]: mutation reducers
//! - [`search`]: conversation search

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod poll;
pub mod reducer;
pub mod search;

// Re-export commonly used types
pub use config::Config;
pub use error::{PollError, Result};
pub use poll::{MutationHint, Poll, PollType};
pub use reducer::{form_poll_reducer, poll_reducer, FormPollAction, PollAction, Reduction};
pub use search::{ConversationSearchService, SearchFilters, SearchOptions, SearchResult};

//! Conversation search module
//!
//! Structured filters, literal full-text matching with highlights, and a
//! result cache in front of both.

pub mod filters;
pub mod highlight;
pub mod service;
pub mod types;

pub use filters::apply_filters;
pub use highlight::Highlighter;
pub use service::ConversationSearchService;
pub use types::*;

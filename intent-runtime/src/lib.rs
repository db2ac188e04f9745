//! intent-runtime: chat-to-poll editing
//!
//! Turns free-text chat messages into typed poll mutations and replays them
//! through the `poll-rs` reducers.
//!
//! # Example
//!
//! ```no_run
//! use intent_runtime::intent::{DetectOptions, IntentService};
//! use poll_rs::Poll;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let service = IntentService::default();
//! let state = Some(Arc::new(Poll::new_date("Dîner d'équipe")));
//!
//! if let Some(intent) = service
//!     .detect_intent("Ajoute le 12/06/2025", state.as_deref().unwrap(), &DetectOptions::default())
//!     .await
//! {
//!     let reduction = intent_runtime::apply_intent(state, &intent);
//!     assert_eq!(reduction.state.unwrap().dates, vec!["2025-06-12"]);
//! }
//! # }
//! ```

pub mod config;
pub mod error;
pub mod intent;
pub mod llm;

pub use config::RuntimeConfig;
pub use error::{IntentError, Result};
pub use intent::{DetectOptions, IntentResult, IntentService, StrategyRegistry};

use poll_rs::reducer::{poll_reducer, Reduction};
use poll_rs::Poll;
use std::sync::Arc;
use tracing::debug;

/// Run the action carried by `intent` through the poll reducer.
///
/// Results without an action leave `state` untouched.
pub fn apply_intent(state: Option<Arc<Poll>>, intent: &IntentResult) -> Reduction {
    match (&intent.action, intent.is_modification) {
        (Some(action), true) => poll_reducer(state, action.clone()),
        _ => {
            debug!("Intent carries no action, nothing to apply");
            Reduction::unchanged(state)
        }
    }
}

//! Intent detection
//!
//! Chat message in, at most one typed [`poll_rs::PollAction`] out.

pub mod registry;
pub mod service;
pub mod strategies;
pub mod strategy;
pub mod types;

pub use registry::StrategyRegistry;
pub use service::IntentService;
pub use strategy::IntentDetectionStrategy;
pub use types::{DetectOptions, IntentResult, ModifiedField, StrategyKind};

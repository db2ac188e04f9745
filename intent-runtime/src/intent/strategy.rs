//! Strategy plug-in interface

use async_trait::async_trait;
use poll_rs::{Poll, PollType};

use super::types::{IntentResult, StrategyKind};

/// Turns a chat message into at most one poll modification
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntentDetectionStrategy: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    fn can_handle(&self, poll_type: PollType) -> bool;

    /// `Ok(None)` when the message is not recognized
    async fn detect(&self, message: &str, poll: &Poll) -> anyhow::Result<Option<IntentResult>>;
}

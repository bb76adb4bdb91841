//! Call-scoped metadata: cancellation, deadline and per-call options.
//!
//! None of this is application data. The cloning client passes a
//! `CallContext` and the `CallOption` slice to its delegate exactly as it
//! received them.

use crate::cancel::CancellationToken;
use crate::{DataplaneError, Result};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Context carried by every call.
///
/// Cloning a context shares its cancellation token, so a clone handed to the
/// server side is cancelled together with the caller's copy.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    metadata: BTreeMap<String, String>,
}

impl CallContext {
    /// Create a context with no deadline and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline to `timeout` from now, keeping an earlier deadline if one is set.
    ///
    /// A timeout too large to represent as an instant leaves the deadline unchanged.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Set the deadline, keeping an earlier deadline if one is set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata_entries(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait until the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Fail if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<()> {
        self.cancel.check()?;
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DataplaneError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Per-call option, the equivalent of a gRPC call option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOption {
    /// Bound this call to at most the given duration.
    Timeout(Duration),
    /// Send an extra header with the call.
    Header(String, String),
    /// Wait for the server to become ready instead of failing fast.
    WaitForReady(bool),
}

impl CallOption {
    pub fn header(key: impl Into<String>, value: impl Into<String>) -> Self {
        CallOption::Header(key.into(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_live() {
        let ctx = CallContext::new();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn test_clone_shares_cancellation() {
        let ctx = CallContext::new();
        let server_side = ctx.clone().with_metadata("x-request-id", "42");

        ctx.cancel();

        assert!(server_side.is_cancelled());
        assert!(matches!(server_side.check(), Err(DataplaneError::Cancelled)));
        assert_eq!(ctx.metadata("x-request-id"), None);
        assert_eq!(server_side.metadata("x-request-id"), Some("42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_earliest() {
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(60));

        assert_eq!(ctx.remaining(), Some(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(matches!(ctx.check(), Err(DataplaneError::DeadlineExceeded)));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_unrepresentable_timeout_leaves_deadline_unchanged() {
        let ctx = CallContext::new().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());

        let bounded = CallContext::new().with_timeout(Duration::from_secs(5));
        let deadline = bounded.deadline();
        assert_eq!(bounded.with_timeout(Duration::MAX).deadline(), deadline);
    }
}

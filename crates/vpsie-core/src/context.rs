//! Per-call cancellation and deadlines.

use std::time::Duration;
use tokio::time::Instant;

pub use tokio_util::sync::CancellationToken;

/// Caller-controlled limits for a call.
///
/// Cancelling the token aborts an in-flight send or a pending retry sleep and
/// the call returns [`Error::Cancelled`](crate::Error::Cancelled). An expired
/// deadline ends the call with a timed-out transport error.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie the call to `token`.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Resolves when the deadline passes; never resolves without one.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_is_unbounded() {
        let ctx = RequestContext::new();
        assert!(!ctx.is_cancelled());
        assert!(!ctx.is_expired());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancellation_is_shared_with_the_token() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.clone().is_cancelled());
    }

    #[test]
    fn cancelled_resolves_once_token_fires() {
        let ctx = RequestContext::new();
        ctx.cancellation_token().cancel();
        tokio_test::block_on(ctx.cancelled());
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn deadline_expires() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(10));
        assert!(ctx.deadline().is_some());
        ctx.expired().await;
        assert!(ctx.is_expired());
    }
}

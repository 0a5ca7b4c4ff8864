//! Cancellation and deadline signals threaded into store traversals.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::RegistryError;

/// Per-request cancellation scope.
///
/// Long traversals call [`QueryContext::check`] before each step and abort
/// as soon as the token is cancelled or the deadline passes. Clones share the
/// same token.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a copy that additionally expires after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fails if the context was cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Cancelled`] or [`RegistryError::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), RegistryError> {
        if self.cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(RegistryError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn background_never_fails() {
        assert!(QueryContext::background().check().is_ok());
    }

    #[test]
    fn cancel_reaches_clones() {
        let ctx = QueryContext::background();
        let clone = ctx.clone();
        ctx.cancel();
        assert_eq!(clone.check().unwrap_err().code(), ErrorCode::Cancelled);
    }

    #[test]
    fn elapsed_deadline_fails() {
        let ctx = QueryContext::background().with_timeout(Duration::ZERO);
        assert_eq!(ctx.check().unwrap_err().code(), ErrorCode::DeadlineExceeded);
    }

    #[test]
    fn tighter_deadline_wins() {
        let ctx = QueryContext::background()
            .with_timeout(Duration::ZERO)
            .with_timeout(Duration::from_secs(3600));
        assert!(ctx.check().is_err());
    }

    #[test]
    fn cancellation_takes_precedence_over_deadline() {
        let ctx = QueryContext::background().with_timeout(Duration::ZERO);
        ctx.cancel();
        assert_eq!(ctx.check().unwrap_err().code(), ErrorCode::Cancelled);
    }
}

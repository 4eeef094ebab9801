//! Cancellation and deadline handle passed to the semantic capability.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::semantic::SemanticError;

/// Cloneable cancellation handle with an optional deadline.
///
/// Clones share the cancel flag, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SearchContext {
    /// A context that never expires on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now. A timeout too large to
    /// represent as an [`Instant`] means no deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Instant::now()
            .checked_add(timeout)
            .map_or_else(Self::new, Self::with_deadline)
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when no deadline is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context was cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticError::Cancelled`] after [`cancel`](Self::cancel),
    /// or [`SemanticError::DeadlineExceeded`] once the deadline is reached.
    pub fn check(&self) -> Result<(), SemanticError> {
        if self.is_cancelled() {
            return Err(SemanticError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SemanticError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_passes_check() {
        let ctx = SearchContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.remaining().is_none());
        assert_eq!(ctx.check(), Ok(()));
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = SearchContext::new();
        let handle = ctx.clone();
        handle.cancel();

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check(), Err(SemanticError::Cancelled));
    }

    #[test]
    fn expired_deadline_fails_check() {
        let ctx = SearchContext::with_deadline(Instant::now());
        assert_eq!(ctx.check(), Err(SemanticError::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn unrepresentable_timeout_has_no_deadline() {
        let ctx = SearchContext::with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert_eq!(ctx.check(), Ok(()));
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let ctx = SearchContext::with_timeout(Duration::from_secs(60));
        ctx.cancel();
        assert_eq!(ctx.check(), Err(SemanticError::Cancelled));
    }
}

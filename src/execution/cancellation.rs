//! # Cooperative Cancellation
//!
//! A clonable cancel flag with async wait support. Cancellation is
//! cooperative: the engine checks the signal before dispatching work and
//! races it against backoff waits; in-flight attempts are never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Cancellation signal shared between a batch submitter and the engine.
///
/// All clones observe the same state. `cancel` is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<SignalState>,
}

#[derive(Debug, Default)]
struct SignalState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    /// Create a signal in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake all waiters.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is requested.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            // Register the waiter before re-checking so a concurrent
            // cancel() between the check and the await is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_starts_not_cancelled() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_after_cancel() {
        let signal = CancellationSignal::new();
        signal.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let signal = CancellationSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move {
                signal.cancelled().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        signal.cancel();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let signal = CancellationSignal::new();
        signal.cancel();
        signal.cancel();
        assert!(signal.is_cancelled());
    }
}

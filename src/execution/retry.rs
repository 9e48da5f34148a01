//! # Retry Policy
//!
//! Reusable retry policy: attempt budget, exponential-backoff delay
//! function, and retryable-error predicate. Independent of the executor so
//! the policy is unit-testable on its own.

use std::time::Duration;

use crate::config::{BackoffConfig, EngineConfig};

use super::errors::{AttemptError, ExecutorError};
use super::types::Task;

/// Retry policy for one task: how many attempts, how long to wait between
/// them, and which errors are worth retrying.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffConfig,
}

impl RetryPolicy {
    /// Create a policy with an explicit attempt budget (first attempt
    /// included) and backoff shape.
    pub fn new(max_attempts: u32, backoff: BackoffConfig) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Resolve the policy for a task against the engine configuration.
    ///
    /// A task's own `max_retries` wins over the engine default; either way
    /// the budget is retries + 1 attempts.
    pub fn for_task(task: &Task, config: &EngineConfig) -> Self {
        let retries = task.max_retries.unwrap_or(config.default_max_retries);
        Self::new(retries + 1, config.backoff.clone())
    }

    /// Total attempts allowed, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether this error class is worth retrying at all.
    pub fn is_retryable(&self, error: &AttemptError) -> bool {
        !matches!(
            error,
            AttemptError::Executor(ExecutorError::NonRetryable(_))
        )
    }

    /// Whether to retry after the given 1-based attempt failed with `error`.
    pub fn should_retry(&self, error: &AttemptError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_retryable(error)
    }

    /// Delay to wait after the given 1-based attempt failed: `base *
    /// multiplier^(attempt-1)`, capped at the configured maximum, with
    /// optional jitter of up to 10%.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay = self
            .backoff
            .base_delay()
            .mul_f64(self.backoff.multiplier.powi(exponent as i32))
            .min(self.backoff.max_delay());

        if self.backoff.jitter {
            let jitter = fastrand::f64() * 0.1;
            delay.mul_f64(1.0 + jitter).min(self.backoff.max_delay())
        } else {
            delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::types::TaskPayload;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, BackoffConfig::default())
    }

    #[test]
    fn test_exponential_delay_progression() {
        let policy = policy(5);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let backoff = BackoffConfig {
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            multiplier: 2.0,
            jitter: false,
        };
        let policy = RetryPolicy::new(10, backoff);
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let backoff = BackoffConfig {
            base_delay_ms: 1000,
            max_delay_ms: 300_000,
            multiplier: 2.0,
            jitter: true,
        };
        let policy = RetryPolicy::new(5, backoff);
        for _ in 0..100 {
            let delay = policy.delay_for_attempt(2);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2200));
        }
    }

    #[test]
    fn test_non_retryable_predicate() {
        let policy = policy(3);
        let transient: AttemptError = ExecutorError::Execution("flaky".into()).into();
        let permanent: AttemptError = ExecutorError::NonRetryable("bad payload".into()).into();
        let timeout = AttemptError::Timeout(Duration::from_secs(1));

        assert!(policy.is_retryable(&transient));
        assert!(policy.is_retryable(&timeout));
        assert!(!policy.is_retryable(&permanent));
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let policy = policy(3);
        let err: AttemptError = ExecutorError::Execution("flaky".into()).into();

        assert!(policy.should_retry(&err, 1));
        assert!(policy.should_retry(&err, 2));
        assert!(!policy.should_retry(&err, 3));
    }

    #[test]
    fn test_for_task_resolves_budget() {
        let config = EngineConfig::default();
        let defaulted = Task::new("a", TaskPayload::default());
        let overridden = Task::new("b", TaskPayload::default()).with_max_retries(0);

        assert_eq!(RetryPolicy::for_task(&defaulted, &config).max_attempts(), 4);
        assert_eq!(RetryPolicy::for_task(&overridden, &config).max_attempts(), 1);
    }
}

//! # Execution Errors
//!
//! Error taxonomy for the execution engine. Batch-level errors
//! ([`EngineError`]) propagate to the caller of `submit_batch`; per-task
//! errors ([`AttemptError`]) are captured into that task's `TaskResult` and
//! never escape the batch.

use std::time::Duration;

use crate::constants::error_codes;

/// Fatal errors raised at engine construction or batch submission.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid engine configuration; raised at construction.
    #[error("invalid engine configuration: {0}")]
    Configuration(String),

    /// A batch contained two tasks with the same identifier; nothing was
    /// dispatched.
    #[error("duplicate task id in batch: {0}")]
    DuplicateTaskId(String),

    /// A batch contained no tasks.
    #[error("batch contains no tasks")]
    EmptyBatch,

    /// The slot discipline failed internally.
    #[error("concurrency slot acquisition failed: {0}")]
    Concurrency(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failures reported by the executor capability for a single attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutorError {
    /// The attempt failed but a retry may succeed.
    #[error("task execution failed: {0}")]
    Execution(String),

    /// Retry is futile (e.g. malformed payload); the task fails immediately.
    #[error("non-retryable task failure: {0}")]
    NonRetryable(String),
}

/// Outcome of a single failed attempt, before the retry policy is applied.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AttemptError {
    /// The executor capability reported a failure.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// The attempt exceeded its allotted time.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

impl AttemptError {
    /// Error code recorded on the task result when this error is final.
    pub fn error_code(&self) -> &'static str {
        match self {
            AttemptError::Executor(ExecutorError::NonRetryable(_)) => error_codes::NON_RETRYABLE,
            AttemptError::Executor(ExecutorError::Execution(_)) => error_codes::EXECUTION_ERROR,
            AttemptError::Timeout(_) => error_codes::EXECUTION_TIMEOUT,
        }
    }
}

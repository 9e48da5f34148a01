//! # Executor Capability
//!
//! The trait the engine delegates actual task work to. Implementations wrap
//! whatever performs tasks (an AI decision service, a browser driver, an
//! HTTP client) and may be called concurrently from multiple attempts.

use async_trait::async_trait;

use super::errors::ExecutorError;
use super::types::TaskPayload;

/// External capability that performs a task payload.
///
/// The engine treats the payload and the result as opaque. Implementations
/// must be safe to invoke concurrently up to the engine's concurrency
/// ceiling. Returning [`ExecutorError::NonRetryable`] short-circuits the
/// retry policy; any other error is retried per policy.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Perform one attempt of a task.
    async fn perform(&self, payload: &TaskPayload) -> Result<serde_json::Value, ExecutorError>;

    /// Implementation name used in logs.
    fn name(&self) -> &str {
        "task-executor"
    }
}

#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskfleet Core
//!
//! High-performance Rust core for bounded-concurrency automation task execution.
//!
//! ## Overview
//!
//! Taskfleet Core executes batches of automation tasks against an external
//! executor capability (an AI-driven browser agent, an API client, a scripted
//! action runner) while enforcing a global concurrency ceiling. Tasks are
//! dispatched in priority order, transient failures are retried with
//! exponential backoff, and every batch resolves into a single aggregate
//! report.
//!
//! ## Architecture
//!
//! The engine follows a **delegation-based architecture**: Rust owns
//! scheduling, concurrency discipline, retry policy, and result aggregation,
//! while the [`execution::executor::TaskExecutor`] capability owns the actual
//! work. The engine never interprets task payloads; they pass through to the
//! executor verbatim.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: an explicit semaphore-backed slot discipline
//!   caps in-flight attempts at a configured ceiling
//! - **Priority dispatch**: deterministic ordering by priority, complexity,
//!   and submission order
//! - **Retry with backoff**: exponential backoff between attempts, with a
//!   retryable-error predicate and optional jitter
//! - **Cooperative cancellation**: in-flight attempts finish, undispatched
//!   tasks resolve as cancelled, the report stays complete
//! - **Batch reporting**: completion-ordered results with success/failure
//!   accounting and wall-clock timing
//!
//! ## Module Organization
//!
//! - [`execution`] - The task execution engine and its supporting objects
//! - [`config`] - Engine configuration with validation and YAML loading
//! - [`logging`] - Structured logging initialization
//! - [`constants`] - System defaults and error-code constants
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskfleet_core::config::EngineConfig;
//! use taskfleet_core::execution::engine::ExecutionEngine;
//! use taskfleet_core::execution::executor::TaskExecutor;
//! use taskfleet_core::execution::types::{Task, TaskPayload, TaskPriority};
//!
//! # async fn example(executor: Arc<dyn TaskExecutor>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ExecutionEngine::new(executor, EngineConfig::default())?;
//!
//! let tasks = vec![
//!     Task::new(
//!         "checkout-flow",
//!         TaskPayload::new("fill and submit the checkout form", "https://shop.example/checkout"),
//!     )
//!     .with_priority(TaskPriority::High)
//!     .with_complexity(3.0),
//! ];
//!
//! let report = engine.submit_batch(tasks).await?;
//! println!("{}/{} tasks succeeded", report.successful_tasks, report.total_tasks);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod execution;
pub mod logging;

// Re-export commonly used types
pub use config::{BackoffConfig, EngineConfig};
pub use execution::cancellation::CancellationSignal;
pub use execution::engine::ExecutionEngine;
pub use execution::errors::{EngineError, ExecutorError};
pub use execution::executor::TaskExecutor;
pub use execution::types::{
    BatchReport, ExecutionStats, Task, TaskPayload, TaskPriority, TaskResult, TaskStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_module_exports() {
        let task = Task::new("t1", TaskPayload::new("navigate", "https://example.com"));
        assert_eq!(task.id, "t1");
        assert_eq!(task.priority, TaskPriority::Normal);
    }
}

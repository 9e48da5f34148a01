//! # Task Execution Engine
//!
//! Bounded-concurrency batch execution of automation tasks.
//!
//! ## Core Components
//!
//! - **ExecutionEngine**: coordinates a batch: validates it, dispatches in
//!   priority order, enforces the concurrency ceiling, and aggregates results
//! - **TaskExecutor**: the capability trait the engine delegates actual work to
//! - **ExecutorSlots**: the concurrency ceiling as an explicit, instrumented
//!   semaphore discipline
//! - **RetryPolicy**: attempts, backoff function, and retryable-error
//!   predicate, independent of the executor
//! - **CancellationSignal**: cooperative cancellation of an in-progress batch
//!
//! ## Execution Flow
//!
//! ```text
//! ┌───────────┐    ┌─────────────────┐    ┌───────────────┐
//! │ submit    │───▶│ sort_for_dispatch│──▶│ ExecutorSlots │──┐
//! │ batch     │    │ (priority order) │   │ (acquire slot)│  │ per attempt
//! └───────────┘    └─────────────────┘    └───────────────┘  ▼
//!                                                     ┌──────────────┐
//!      BatchReport ◀── completion-order results ◀─────│ TaskExecutor │
//!                       (retries via RetryPolicy)     └──────────────┘
//! ```

pub mod cancellation;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod ordering;
pub mod retry;
pub mod slots;
pub mod types;

// Re-export core types and components for easy access
pub use cancellation::CancellationSignal;
pub use engine::ExecutionEngine;
pub use errors::{AttemptError, EngineError, EngineResult, ExecutorError};
pub use executor::TaskExecutor;
pub use ordering::sort_for_dispatch;
pub use retry::RetryPolicy;
pub use slots::{ExecutorSlots, SlotPermit};
pub use types::{
    BatchReport, ExecutionStats, Task, TaskPayload, TaskPriority, TaskResult, TaskStatus,
};

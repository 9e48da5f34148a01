//! # System Constants
//!
//! Defaults and error-code constants that define the operational boundaries
//! of the task execution engine.

use std::time::Duration;

/// Default ceiling on concurrently in-flight task attempts.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff between attempts.
pub const DEFAULT_BACKOFF_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default cap on any single backoff delay.
pub const DEFAULT_BACKOFF_MAX_DELAY: Duration = Duration::from_secs(300);

/// Default exponential backoff multiplier.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Error codes recorded on failed task results for tracking and triage.
pub mod error_codes {
    /// The executor capability reported a retryable failure.
    pub const EXECUTION_ERROR: &str = "EXECUTION_ERROR";

    /// The executor capability reported a failure retry cannot fix.
    pub const NON_RETRYABLE: &str = "NON_RETRYABLE";

    /// An attempt exceeded its allotted time.
    pub const EXECUTION_TIMEOUT: &str = "EXECUTION_TIMEOUT";

    /// The batch was cancelled before the task resolved.
    pub const CANCELLED: &str = "CANCELLED";

    /// A worker task failed inside the engine itself.
    pub const CONCURRENCY_ERROR: &str = "CONCURRENCY_ERROR";
}

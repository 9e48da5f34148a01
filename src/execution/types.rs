//! # Execution Types
//!
//! Core data structures shared across the execution engine: tasks and their
//! payloads, per-task results, and the aggregate batch report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::constants::error_codes;

/// Priority levels for task dispatch ordering.
///
/// Higher priorities are dispatched first. The derived ordering follows
/// declaration order, so `Critical > High > Normal > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Process after normal tasks
    Low,
    /// Standard processing
    #[default]
    Normal,
    /// Process before normal tasks
    High,
    /// Process first
    Critical,
}

/// Opaque work description passed verbatim to the executor capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    /// What the executor should do.
    pub instruction: String,
    /// Where it should do it (URL, resource name, endpoint).
    pub target: String,
    /// Executor-specific parameters, uninterpreted by the engine.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl TaskPayload {
    /// Create a payload from an instruction and a target.
    pub fn new(instruction: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            target: target.into(),
            parameters: HashMap::new(),
        }
    }

    /// Attach an executor-specific parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// One unit of automation work submitted to the engine.
///
/// Immutable once submitted. Identifiers must be unique within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Batch-unique identifier.
    pub id: String,
    /// Optional human-readable name for logs and reports.
    pub name: Option<String>,
    /// Dispatch priority.
    pub priority: TaskPriority,
    /// Non-negative complexity score; higher scores dispatch earlier within
    /// the same priority.
    pub complexity: f64,
    /// Opaque work description for the executor capability.
    pub payload: TaskPayload,
    /// Retries after the first attempt; engine default when `None`.
    pub max_retries: Option<u32>,
    /// Per-attempt timeout; unbounded when `None`.
    pub timeout: Option<Duration>,
}

impl Task {
    /// Create a task with normal priority and zero complexity.
    pub fn new(id: impl Into<String>, payload: TaskPayload) -> Self {
        Self {
            id: id.into(),
            name: None,
            priority: TaskPriority::default(),
            complexity: 0.0,
            payload,
            max_retries: None,
            timeout: None,
        }
    }

    /// Set a human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the dispatch priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the complexity score used for dispatch ordering.
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    /// Override the engine's default retry count for this task.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Bound each attempt of this task to the given duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Final disposition of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task succeeded within its attempt budget
    Completed,
    /// Task exhausted its attempts or hit a non-retryable failure
    Failed,
    /// Batch was cancelled before the task resolved
    Cancelled,
}

/// Result of one task, produced exactly once after the task resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Identifier of the task this result belongs to.
    pub task_id: String,
    /// Final disposition.
    pub status: TaskStatus,
    /// Executor output, present only on success.
    pub output: Option<serde_json::Value>,
    /// Error message, present only on failure or cancellation.
    pub error_message: Option<String>,
    /// Error code for tracking, present only on failure or cancellation.
    pub error_code: Option<String>,
    /// Attempts actually made (0 for tasks cancelled before dispatch).
    pub attempts: u32,
    /// Wall-clock time from first dispatch to resolution, including retries
    /// and backoff waits.
    pub execution_duration: Duration,
    /// When the result was recorded.
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    /// Record a successful task.
    pub fn completed(
        task_id: impl Into<String>,
        output: serde_json::Value,
        attempts: u32,
        execution_duration: Duration,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Completed,
            output: Some(output),
            error_message: None,
            error_code: None,
            attempts,
            execution_duration,
            completed_at: Utc::now(),
        }
    }

    /// Record a failed task.
    pub fn failed(
        task_id: impl Into<String>,
        error_message: impl Into<String>,
        error_code: impl Into<String>,
        attempts: u32,
        execution_duration: Duration,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failed,
            output: None,
            error_message: Some(error_message.into()),
            error_code: Some(error_code.into()),
            attempts,
            execution_duration,
            completed_at: Utc::now(),
        }
    }

    /// Record a task the batch cancellation caught before it resolved.
    pub fn cancelled(
        task_id: impl Into<String>,
        attempts: u32,
        execution_duration: Duration,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Cancelled,
            output: None,
            error_message: Some("batch cancelled before task resolved".to_string()),
            error_code: Some(error_codes::CANCELLED.to_string()),
            attempts,
            execution_duration,
            completed_at: Utc::now(),
        }
    }

    /// Whether the task completed successfully.
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Aggregate report for one batch, produced once every task has resolved.
///
/// `results` is in completion order, which is not the dispatch order.
/// Cancelled results count toward `failed_tasks`, so
/// `successful_tasks + failed_tasks == total_tasks` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Identifier assigned to this batch run.
    pub batch_id: Uuid,
    /// Number of tasks submitted.
    pub total_tasks: usize,
    /// Tasks that completed successfully.
    pub successful_tasks: usize,
    /// Tasks that did not complete (including cancelled tasks).
    pub failed_tasks: usize,
    /// Subset of `failed_tasks` resolved by cancellation.
    pub cancelled_tasks: usize,
    /// Per-task results in completion order.
    pub results: Vec<TaskResult>,
    /// Wall-clock time from first dispatch to last resolution.
    pub total_duration: Duration,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished.
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    /// Build a report from completion-ordered results.
    pub(crate) fn from_results(
        batch_id: Uuid,
        results: Vec<TaskResult>,
        total_duration: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let successful_tasks = results.iter().filter(|r| r.is_success()).count();
        let cancelled_tasks = results
            .iter()
            .filter(|r| r.status == TaskStatus::Cancelled)
            .count();
        Self {
            batch_id,
            total_tasks: results.len(),
            successful_tasks,
            failed_tasks: results.len() - successful_tasks,
            cancelled_tasks,
            results,
            total_duration,
            started_at,
            completed_at: Utc::now(),
        }
    }

    /// Percentage of tasks that completed successfully.
    pub fn success_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        (self.successful_tasks as f64 / self.total_tasks as f64) * 100.0
    }
}

/// Snapshot of the engine's slot discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Attempts currently holding a slot.
    pub in_flight: usize,
    /// Slots currently free.
    pub available_capacity: usize,
    /// Configured concurrency ceiling.
    pub max_concurrency: usize,
    /// Highest concurrent in-flight count observed so far.
    pub high_water_mark: usize,
}

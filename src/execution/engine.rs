//! # Execution Engine
//!
//! Coordinates batch execution: validates the batch, dispatches tasks in
//! priority order under the concurrency ceiling, drives each task's retry
//! loop, and aggregates completion-ordered results into a [`BatchReport`].
//!
//! ## Concurrency Discipline
//!
//! The coordinator claims a slot from [`ExecutorSlots`] *before* spawning a
//! task's worker, so dispatch order is exactly the sorted order. A slot is
//! held for the duration of one attempt only; backoff waits between retries
//! release the slot and re-acquire one for the next attempt.
//!
//! ## Error Propagation
//!
//! Per-task failures never escape the batch; they are captured into that
//! task's [`TaskResult`]. `submit_batch` itself only fails for validation
//! errors, before anything is dispatched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskfleet_core::config::EngineConfig;
//! use taskfleet_core::execution::engine::ExecutionEngine;
//! use taskfleet_core::execution::executor::TaskExecutor;
//! use taskfleet_core::execution::types::{Task, TaskPayload};
//!
//! # async fn example(executor: Arc<dyn TaskExecutor>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ExecutionEngine::new(executor, EngineConfig::default())?;
//! let report = engine
//!     .submit_batch(vec![Task::new("t1", TaskPayload::new("ping", "https://example.com"))])
//!     .await?;
//! assert_eq!(report.total_tasks, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::constants::error_codes;

use super::cancellation::CancellationSignal;
use super::errors::{AttemptError, EngineError, EngineResult};
use super::executor::TaskExecutor;
use super::ordering::sort_for_dispatch;
use super::retry::RetryPolicy;
use super::slots::{ExecutorSlots, SlotPermit};
use super::types::{BatchReport, ExecutionStats, Task, TaskResult};

/// Bounded-concurrency task execution engine.
///
/// Cheap to clone; clones share the same slot pool and executor.
#[derive(Clone)]
pub struct ExecutionEngine {
    executor: Arc<dyn TaskExecutor>,
    config: EngineConfig,
    slots: ExecutorSlots,
}

impl ExecutionEngine {
    /// Create an engine over the given executor capability.
    ///
    /// Fails with a configuration error if the config is invalid
    /// (e.g. `max_concurrency < 1`).
    pub fn new(executor: Arc<dyn TaskExecutor>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let slots = ExecutorSlots::new(config.max_concurrency);

        info!(
            executor = executor.name(),
            max_concurrency = config.max_concurrency,
            default_max_retries = config.default_max_retries,
            "Execution engine initialized"
        );

        Ok(Self {
            executor,
            config,
            slots,
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the slot discipline.
    pub fn execution_stats(&self) -> ExecutionStats {
        ExecutionStats {
            in_flight: self.slots.in_flight(),
            available_capacity: self.slots.available(),
            max_concurrency: self.slots.limit(),
            high_water_mark: self.slots.high_water_mark(),
        }
    }

    /// Execute a batch of tasks to completion and return the aggregate
    /// report.
    pub async fn submit_batch(&self, tasks: Vec<Task>) -> EngineResult<BatchReport> {
        self.submit_batch_with_cancellation(tasks, CancellationSignal::new())
            .await
    }

    /// Execute a batch with a caller-held cancellation signal.
    ///
    /// On cancellation no new attempts are dispatched; in-flight attempts
    /// finish, and the remaining tasks resolve as cancelled. The report
    /// still accounts for every submitted task.
    #[instrument(skip(self, tasks, signal), fields(task_count = tasks.len()))]
    pub async fn submit_batch_with_cancellation(
        &self,
        tasks: Vec<Task>,
        signal: CancellationSignal,
    ) -> EngineResult<BatchReport> {
        validate_batch(&tasks)?;

        let batch_id = Uuid::new_v4();
        let total = tasks.len();
        let mut ordered = tasks;
        sort_for_dispatch(&mut ordered);

        info!(
            batch_id = %batch_id,
            task_count = total,
            max_concurrency = self.config.max_concurrency,
            "Starting batch execution"
        );

        let started_at = Utc::now();
        let batch_start = Instant::now();
        let results: Arc<Mutex<Vec<TaskResult>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let mut handles: Vec<(String, JoinHandle<()>)> = Vec::with_capacity(total);

        for task in ordered {
            if signal.is_cancelled() {
                debug!(batch_id = %batch_id, task_id = %task.id, "Batch cancelled, task not dispatched");
                results
                    .lock()
                    .push(TaskResult::cancelled(task.id, 0, Duration::ZERO));
                continue;
            }

            // Claim the first-attempt slot here so dispatch order is exactly
            // the sorted order.
            let permit = tokio::select! {
                permit = self.slots.acquire() => Some(permit?),
                _ = signal.cancelled() => None,
            };
            let Some(permit) = permit else {
                results
                    .lock()
                    .push(TaskResult::cancelled(task.id, 0, Duration::ZERO));
                continue;
            };

            let task_id = task.id.clone();
            let worker = TaskWorker {
                executor: Arc::clone(&self.executor),
                policy: RetryPolicy::for_task(&task, &self.config),
                slots: self.slots.clone(),
                signal: signal.clone(),
            };
            let results = Arc::clone(&results);
            let handle = tokio::spawn(async move {
                let result = worker.run(task, Some(permit)).await;
                results.lock().push(result);
            });
            handles.push((task_id, handle));
        }

        // Wait for every dispatched worker; a panicked worker still yields a
        // result so the report covers all submitted tasks.
        let (task_ids, joins): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let join_results = futures::future::join_all(joins).await;
        for (task_id, join_result) in task_ids.into_iter().zip(join_results) {
            if let Err(e) = join_result {
                error!(batch_id = %batch_id, task_id = %task_id, error = %e, "Task worker panicked");
                results.lock().push(TaskResult::failed(
                    task_id,
                    format!("task worker panicked: {e}"),
                    error_codes::CONCURRENCY_ERROR,
                    1,
                    Duration::ZERO,
                ));
            }
        }

        let results = {
            let mut guard = results.lock();
            std::mem::take(&mut *guard)
        };
        let report =
            BatchReport::from_results(batch_id, results, batch_start.elapsed(), started_at);

        info!(
            batch_id = %batch_id,
            successful = report.successful_tasks,
            failed = report.failed_tasks,
            cancelled = report.cancelled_tasks,
            duration_ms = report.total_duration.as_millis() as u64,
            "Batch execution completed"
        );

        Ok(report)
    }

    /// Execute a single task with the engine's retry policy, outside a batch.
    ///
    /// Shares the engine's slot pool, so single-task executions count
    /// against the same concurrency ceiling as running batches.
    pub async fn execute_with_retry(&self, task: Task) -> TaskResult {
        let worker = TaskWorker {
            executor: Arc::clone(&self.executor),
            policy: RetryPolicy::for_task(&task, &self.config),
            slots: self.slots.clone(),
            signal: CancellationSignal::new(),
        };
        worker.run(task, None).await
    }
}

/// Per-task retry loop. Owns no shared mutable state beyond the slot pool.
struct TaskWorker {
    executor: Arc<dyn TaskExecutor>,
    policy: RetryPolicy,
    slots: ExecutorSlots,
    signal: CancellationSignal,
}

impl TaskWorker {
    /// Run the task to resolution: success, exhausted retries, non-retryable
    /// failure, or cancellation.
    #[instrument(skip_all, fields(task_id = %task.id))]
    async fn run(&self, task: Task, first_permit: Option<SlotPermit>) -> TaskResult {
        let task_start = Instant::now();
        let mut permit = first_permit;
        let mut attempt: u32 = 0;

        loop {
            let held = match permit.take() {
                Some(p) => p,
                None => {
                    // A retry re-dispatch is a new dispatch: racing the slot
                    // wait against the signal keeps cancelled batches from
                    // burning further attempts.
                    let acquired = tokio::select! {
                        acquired = self.slots.acquire() => acquired,
                        _ = self.signal.cancelled() => {
                            return TaskResult::cancelled(task.id, attempt, task_start.elapsed());
                        }
                    };
                    match acquired {
                        Ok(p) => p,
                        Err(e) => {
                            return TaskResult::failed(
                                task.id,
                                e.to_string(),
                                error_codes::CONCURRENCY_ERROR,
                                attempt.max(1),
                                task_start.elapsed(),
                            );
                        }
                    }
                }
            };

            attempt += 1;
            debug!(attempt = attempt, priority = ?task.priority, "Dispatching attempt");

            let outcome = self.attempt_once(&task).await;
            drop(held);

            match outcome {
                Ok(output) => {
                    let duration = task_start.elapsed();
                    info!(
                        attempt = attempt,
                        duration_ms = duration.as_millis() as u64,
                        "Task completed"
                    );
                    return TaskResult::completed(task.id, output, attempt, duration);
                }
                Err(err) => {
                    let retry_wanted = self.policy.should_retry(&err, attempt);

                    if retry_wanted && self.signal.is_cancelled() {
                        return TaskResult::cancelled(task.id, attempt, task_start.elapsed());
                    }

                    if retry_wanted {
                        let delay = self.policy.delay_for_attempt(attempt);
                        warn!(
                            attempt = attempt,
                            error = %err,
                            retry_delay_ms = delay.as_millis() as u64,
                            "Attempt failed, retrying after backoff"
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = self.signal.cancelled() => {
                                return TaskResult::cancelled(task.id, attempt, task_start.elapsed());
                            }
                        }
                        continue;
                    }

                    let duration = task_start.elapsed();
                    error!(
                        attempt = attempt,
                        error = %err,
                        error_code = err.error_code(),
                        "Task failed permanently"
                    );
                    return TaskResult::failed(
                        task.id,
                        err.to_string(),
                        err.error_code(),
                        attempt,
                        duration,
                    );
                }
            }
        }
    }

    /// One attempt against the executor capability, bounded by the task's
    /// per-attempt timeout when present.
    async fn attempt_once(&self, task: &Task) -> Result<serde_json::Value, AttemptError> {
        match task.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.executor.perform(&task.payload)).await {
                    Ok(outcome) => outcome.map_err(AttemptError::from),
                    Err(_) => Err(AttemptError::Timeout(limit)),
                }
            }
            None => self
                .executor
                .perform(&task.payload)
                .await
                .map_err(AttemptError::from),
        }
    }
}

/// Reject empty batches and duplicate task identifiers before dispatch.
fn validate_batch(tasks: &[Task]) -> EngineResult<()> {
    if tasks.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(EngineError::DuplicateTaskId(task.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::errors::ExecutorError;
    use crate::execution::types::TaskPayload;
    use async_trait::async_trait;

    struct NoopExecutor;

    #[async_trait]
    impl TaskExecutor for NoopExecutor {
        async fn perform(
            &self,
            _payload: &TaskPayload,
        ) -> Result<serde_json::Value, ExecutorError> {
            Ok(serde_json::json!({"ok": true}))
        }
    }

    fn sample(id: &str) -> Task {
        Task::new(id, TaskPayload::new("noop", id))
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        let err = validate_batch(&[]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyBatch));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let tasks = vec![sample("a"), sample("b"), sample("a")];
        let err = validate_batch(&tasks).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTaskId(id) if id == "a"));
    }

    #[test]
    fn test_validate_accepts_unique_ids() {
        let tasks = vec![sample("a"), sample("b")];
        assert!(validate_batch(&tasks).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        let result = ExecutionEngine::new(Arc::new(NoopExecutor), config);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_stats_reflect_idle_engine() {
        let engine = ExecutionEngine::new(Arc::new(NoopExecutor), EngineConfig::default()).unwrap();
        let stats = engine.execution_stats();
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.available_capacity, 5);
        assert_eq!(stats.max_concurrency, 5);
        assert_eq!(stats.high_water_mark, 0);
    }
}

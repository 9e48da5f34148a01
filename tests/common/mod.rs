//! Shared test support: a scripted, concurrency-instrumented mock executor.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Semaphore;

use taskfleet_core::execution::errors::ExecutorError;
use taskfleet_core::execution::executor::TaskExecutor;
use taskfleet_core::execution::types::TaskPayload;

/// One scripted call outcome, consumed in order per target.
#[derive(Clone)]
pub enum Step {
    /// Return success immediately.
    Succeed,
    /// Return a retryable execution error.
    Fail(&'static str),
    /// Return a non-retryable error.
    FailNonRetryable(&'static str),
    /// Sleep for the given duration, then succeed (for timeout tests).
    Hang(Duration),
    /// Block until the test releases a permit on the gate, then succeed.
    Gated(Arc<Semaphore>),
}

/// Mock executor scripted per payload target.
///
/// Unscripted targets (or exhausted scripts) succeed. Tracks the dispatch
/// order of `perform` calls and the concurrent-call high-water mark so tests
/// can verify the engine's concurrency ceiling from the outside.
#[derive(Default)]
pub struct MockExecutor {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the outcomes for calls against `target`, consumed in order.
    pub fn script_target(&self, target: &str, steps: Vec<Step>) {
        self.scripts
            .lock()
            .insert(target.to_string(), steps.into());
    }

    /// Targets of every `perform` call, in dispatch order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of `perform` calls made against `target`.
    pub fn call_count(&self, target: &str) -> usize {
        self.calls.lock().iter().filter(|t| *t == target).count()
    }

    /// Total `perform` calls across all targets.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls currently inside `perform`.
    pub fn current_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest concurrent `perform` count observed.
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskExecutor for MockExecutor {
    async fn perform(&self, payload: &TaskPayload) -> Result<serde_json::Value, ExecutorError> {
        self.calls.lock().push(payload.target.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(current, Ordering::SeqCst);

        let step = self
            .scripts
            .lock()
            .get_mut(&payload.target)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Step::Succeed);

        let outcome = match step {
            Step::Succeed => Ok(json!({"target": payload.target, "ok": true})),
            Step::Fail(message) => Err(ExecutorError::Execution(message.to_string())),
            Step::FailNonRetryable(message) => {
                Err(ExecutorError::NonRetryable(message.to_string()))
            }
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(json!({"target": payload.target, "ok": true}))
            }
            Step::Gated(gate) => {
                let permit = gate.acquire().await.expect("test gate closed");
                permit.forget();
                Ok(json!({"target": payload.target, "ok": true}))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    fn name(&self) -> &str {
        "mock-executor"
    }
}

/// Payload whose target doubles as the script key.
pub fn payload(target: &str) -> TaskPayload {
    TaskPayload::new("mock instruction", target)
}

/// Poll `condition` until it holds or `deadline` passes.
pub async fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) {
    let start = std::time::Instant::now();
    while !condition() {
        if start.elapsed() > deadline {
            panic!("condition not met within {deadline:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

//! # Executor Slots
//!
//! The concurrency ceiling as an explicit object: a counting semaphore with
//! an in-flight gauge and a high-water mark. One [`SlotPermit`] is held for
//! the duration of exactly one task attempt; backoff waits between attempts
//! happen without a permit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::errors::{EngineError, EngineResult};

/// Bounded pool of execution slots shared by all attempts of a batch.
#[derive(Debug, Clone)]
pub struct ExecutorSlots {
    semaphore: Arc<Semaphore>,
    limit: usize,
    in_flight: Arc<AtomicUsize>,
    high_water: Arc<AtomicUsize>,
}

/// Exclusive hold on one execution slot; released on drop.
#[derive(Debug)]
pub struct SlotPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExecutorSlots {
    /// Create a pool with the given concurrency limit.
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            in_flight: Arc::new(AtomicUsize::new(0)),
            high_water: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free slot and claim it.
    pub async fn acquire(&self) -> EngineResult<SlotPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| EngineError::Concurrency(e.to_string()))?;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(current, Ordering::SeqCst);

        Ok(SlotPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Configured concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Attempts currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest concurrent in-flight count observed since creation.
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permits_release_on_drop() {
        let slots = ExecutorSlots::new(2);

        let p1 = slots.acquire().await.unwrap();
        let p2 = slots.acquire().await.unwrap();
        assert_eq!(slots.available(), 0);
        assert_eq!(slots.in_flight(), 2);

        drop(p1);
        assert_eq!(slots.available(), 1);
        assert_eq!(slots.in_flight(), 1);

        drop(p2);
        assert_eq!(slots.available(), 2);
        assert_eq!(slots.in_flight(), 0);
        assert_eq!(slots.high_water_mark(), 2);
    }

    #[tokio::test]
    async fn test_acquire_blocks_at_limit() {
        let slots = ExecutorSlots::new(1);
        let held = slots.acquire().await.unwrap();

        let contender = {
            let slots = slots.clone();
            tokio::spawn(async move {
                let _p = slots.acquire().await.unwrap();
            })
        };

        // Contender cannot finish while the permit is held
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(held);
        contender.await.unwrap();
        assert_eq!(slots.high_water_mark(), 1);
    }

    #[tokio::test]
    async fn test_high_water_tracks_peak_not_current() {
        let slots = ExecutorSlots::new(3);
        let p1 = slots.acquire().await.unwrap();
        let p2 = slots.acquire().await.unwrap();
        drop(p1);
        let p3 = slots.acquire().await.unwrap();
        drop(p2);
        drop(p3);

        assert_eq!(slots.in_flight(), 0);
        assert_eq!(slots.high_water_mark(), 2);
    }
}

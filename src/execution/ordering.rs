//! # Dispatch Ordering
//!
//! Pure ordering function for batch dispatch. Kept free of any concurrency
//! machinery so the policy is testable in isolation.

use super::types::Task;

/// Sort tasks into dispatch order.
///
/// Descending priority first, then descending complexity within the same
/// priority. The sort is stable, so tasks that tie on both keys keep their
/// submission order. This determines dispatch order only; completion order
/// under concurrency depends on actual task durations.
pub fn sort_for_dispatch(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.complexity.total_cmp(&a.complexity))
    });
}

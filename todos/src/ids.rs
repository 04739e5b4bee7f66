//! Monotonic todo id generation.

use crate::types::{Todo, TodoId};
use std::sync::atomic::{AtomicI64, Ordering};
use todo_sync_core::environment::Clock;

/// Hands out strictly increasing todo ids
///
/// Seeded from the clock in milliseconds so ids look like the timestamps a
/// user would expect, but never returns an id at or below one it already
/// returned or was told about through [`IdGenerator::observe`]. Two creates
/// in the same millisecond therefore still get distinct ids.
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `first`
    #[must_use]
    pub fn starting_at(first: TodoId) -> Self {
        Self {
            last: AtomicI64::new(first.saturating_sub(1)),
        }
    }

    /// Creates a generator seeded from the current time
    #[must_use]
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::starting_at(clock.now().timestamp_millis())
    }

    /// Record an id that exists elsewhere so it is never handed out
    pub fn observe(&self, id: TodoId) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }

    /// Record every id in a collection
    pub fn observe_all(&self, items: &[Todo]) {
        if let Some(max) = items.iter().map(|t| t.id).max() {
            self.observe(max);
        }
    }

    /// Next id, unique against everything handed out or observed so far
    ///
    /// Returns `None` once `TodoId::MAX` has been handed out or observed.
    #[must_use]
    pub fn next_id(&self) -> Option<TodoId> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }

    /// Next id that is also absent from `items`
    #[must_use]
    pub fn next_unused(&self, items: &[Todo]) -> Option<TodoId> {
        self.observe_all(items);
        self.next_id()
    }
}

//! # Events emitted by the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across three groups:
//! - **Run events**: startup, empty run, teardown
//! - **Task events**: submission, completion, failure, panic
//! - **Recovery events**: escalated failures and failing recovery handlers
//!
//! The [`Event`] struct carries metadata such as timestamp, task name, reason
//! and failure category.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order across subscribers.
//!
//! ## Example
//! ```rust
//! use taskloop::{Event, EventKind, FailureCategory};
//!
//! let ev = Event::new(EventKind::FailureEscalated)
//!     .with_task("poller")
//!     .with_reason("bad input")
//!     .with_category(FailureCategory::custom("value_error"));
//!
//! assert_eq!(ev.kind, EventKind::FailureEscalated);
//! assert_eq!(ev.task.as_deref(), Some("poller"));
//! assert_eq!(ev.reason.as_deref(), Some("bad input"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::failures::FailureCategory;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of orchestrator events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// `run` was called with no task pending.
    EmptyRun,

    /// Every startup hook completed; task submission follows.
    StartupCompleted,

    /// Remaining tasks were cancelled after an escaped failure.
    ///
    /// Sets:
    /// - `count`: number of tasks cancelled
    TasksCancelled,

    /// Shutdown hooks finished; the loop is about to close.
    ShutdownCompleted,

    // === Task events ===
    /// A task was submitted to the running loop.
    ///
    /// Sets:
    /// - `task`: task name
    TaskSubmitted,

    /// A task finished (successfully or after observing cancellation).
    ///
    /// Sets:
    /// - `task`: task name
    TaskFinished,

    /// A task failed; the failure stays local to it.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: error message
    TaskFailed,

    /// A task panicked.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: panic message
    TaskPanicked,

    // === Recovery events ===
    /// A failure escaped the wait cycle and was dispatched to the registry.
    ///
    /// Sets:
    /// - `task`: task name (absent for OS signals)
    /// - `category`: failure category
    /// - `reason`: failure message
    /// - `count`: number of handlers invoked
    FailureEscalated,

    /// A recovery handler failed while handling an escaped failure.
    ///
    /// Sets:
    /// - `task`: handler name
    /// - `category`: failure category
    /// - `reason`: error or panic message
    HandlerFailed,
}

/// Orchestrator event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task or handler name, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, panic payloads, overflow details).
    pub reason: Option<Arc<str>>,
    /// Failure category, for recovery events.
    pub category: Option<FailureCategory>,
    /// Count attached to the event (cancelled tasks, invoked handlers).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            category: None,
            count: None,
        }
    }

    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_category(mut self, category: FailureCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Attaches a count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskSubmitted);
        let b = Event::new(EventKind::TaskFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_count_saturates() {
        let ev = Event::new(EventKind::TasksCancelled).with_count(usize::MAX);
        assert_eq!(ev.count, Some(u32::MAX));
    }
}

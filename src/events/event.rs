//! # Runtime events emitted by the pool, the workers, and the admission path.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Task lifecycle**: creation, admission, phase advances, completion,
//!   deletion, and mid-processing disappearance.
//! - **Drain**: shutdown request and drain outcome.
//! - **Subscriber plumbing**: overflow and panic reports from the fan-out.
//!
//! The [`Event`] struct carries optional metadata: task ID, phase text,
//! worker index, reason, delay.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Stateful subscribers use `seq` to reject events delivered
//! out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering. Starts at 1 so that 0 can
/// serve as the "nothing seen yet" value in stateful subscribers.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// A record was inserted into the status store.
    ///
    /// Sets: `task`.
    TaskCreated,

    /// A task ID was placed onto the admission queue.
    ///
    /// Sets: `task`.
    TaskAdmitted,

    /// Admission was rejected (queue full or closed).
    ///
    /// Sets: `task`, `reason`.
    AdmitRejected,

    /// A worker wrote a new phase for the task it is processing.
    ///
    /// Sets: `task`, `worker`, `phase`.
    PhaseAdvanced,

    /// A worker found its task deleted (before pickup or mid-processing)
    /// and abandoned the remaining phases. Expected control flow, not an
    /// error.
    ///
    /// Sets: `task`, `worker`, `reason`.
    TaskVanished,

    /// A worker finished all phases of its task.
    ///
    /// Sets: `task`, `worker`.
    TaskCompleted,

    /// A record was explicitly deleted from the status store.
    ///
    /// Sets: `task`.
    TaskDeleted,

    // === Drain events ===
    /// Shutdown requested; workers stop picking up new IDs.
    ShutdownRequested,

    /// Every worker finished within the drain deadline.
    DrainedWithinDeadline,

    /// The drain deadline elapsed with workers still busy.
    ///
    /// Sets: `delay_ms` (the deadline).
    DrainTimedOut,

    // === Subscriber plumbing ===
    /// A subscriber's queue dropped an event (full or closed).
    ///
    /// Sets: `task` (subscriber name), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic info).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
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

    /// Task ID (or subscriber name for subscriber plumbing events).
    pub task: Option<Arc<str>>,
    /// Phase text, for `PhaseAdvanced`.
    pub phase: Option<Arc<str>>,
    /// Index of the worker that produced the event.
    pub worker: Option<usize>,
    /// Human-readable reason (rejections, abandonment, panic info).
    pub reason: Option<Arc<str>>,
    /// Duration payload in milliseconds (drain deadline, phase delay).
    pub delay_ms: Option<u64>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            phase: None,
            worker: None,
            reason: None,
            delay_ms: None,
        }
    }

    /// Attaches a task ID (or subscriber name).
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a phase text.
    #[inline]
    pub fn with_phase(mut self, phase: impl Into<Arc<str>>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Attaches the producing worker's index.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a duration payload (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_strictly_monotonic() {
        let a = Event::now(EventKind::TaskCreated);
        let b = Event::now(EventKind::TaskCreated);
        let c = Event::now(EventKind::ShutdownRequested);
        assert!(a.seq < b.seq);
        assert!(b.seq < c.seq);
    }

    #[test]
    fn builders_attach_metadata() {
        let ev = Event::now(EventKind::PhaseAdvanced)
            .with_task("some-id")
            .with_phase("worker-2: started")
            .with_worker(2)
            .with_delay(Duration::from_millis(80));

        assert_eq!(ev.kind, EventKind::PhaseAdvanced);
        assert_eq!(ev.task.as_deref(), Some("some-id"));
        assert_eq!(ev.phase.as_deref(), Some("worker-2: started"));
        assert_eq!(ev.worker, Some(2));
        assert_eq!(ev.delay_ms, Some(80));
        assert_eq!(ev.reason, None);
    }
}

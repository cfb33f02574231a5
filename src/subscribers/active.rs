//! # In-flight task tracker with sequence-based ordering.
//!
//! Maintains the authoritative view of which task IDs are currently inside
//! their phase routine, using event sequence numbers to tolerate reordered
//! phase writes.
//!
//! ```text
//! pool ──► Bus ──► fan-out listener ──► ActiveTracker::on_event()
//!                                              │
//!                                              ▼
//!                                  HashMap<TaskId, last_seq>
//! ```
//!
//! ## Rules
//! - `PhaseAdvanced` inserts the task; `TaskCompleted` / `TaskVanished`
//!   removes it. Finished tasks keep no state, so the map holds at most the
//!   concurrency cap worth of entries at any instant.
//! - A `PhaseAdvanced` with `seq <= last_seq` for a tracked task is
//!   rejected (stale).
//! - Reads (`snapshot`, `active_count`) are eventually consistent with the
//!   bus; the pool uses the snapshot for the drain-timeout report.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::store::TaskId;
use crate::subscribers::Subscribe;

/// Thread-safe tracker of tasks currently being processed.
///
/// ### Responsibilities
/// - Feeds the `stuck` list of [`PoolError::DrainTimeout`](crate::PoolError::DrainTimeout)
/// - Rejects stale phase events using sequence numbers
pub struct ActiveTracker {
    /// Tasks inside their phase routine, id → last seen sequence number.
    state: RwLock<HashMap<TaskId, u64>>,
}

impl ActiveTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Applies an event; returns true when the set of active tasks changed.
    ///
    /// State transitions:
    /// - `PhaseAdvanced` → track the task (or bump its `last_seq`; stale
    ///   lower-seq events are rejected)
    /// - `TaskCompleted` / `TaskVanished` → drop the entry entirely
    /// - other events → ignored
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(task) = ev.task.as_deref() else {
            return false;
        };
        let id = TaskId::from(task);

        let mut state = self.state.write().await;
        match ev.kind {
            EventKind::PhaseAdvanced => match state.entry(id) {
                Entry::Occupied(mut slot) => {
                    if ev.seq <= *slot.get() {
                        return false;
                    }
                    slot.insert(ev.seq);
                    false // already tracked
                }
                Entry::Vacant(slot) => {
                    slot.insert(ev.seq);
                    true
                }
            },
            EventKind::TaskCompleted | EventKind::TaskVanished => state.remove(&id).is_some(),
            _ => false,
        }
    }

    /// Returns the sorted IDs of tasks currently inside their phase routine.
    pub async fn snapshot(&self) -> Vec<TaskId> {
        let state = self.state.read().await;
        let mut active: Vec<TaskId> = state.keys().cloned().collect();
        active.sort_unstable();
        active
    }

    /// Returns how many tasks are currently inside their phase routine.
    pub async fn active_count(&self) -> usize {
        self.state.read().await.len()
    }
}

impl Default for ActiveTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for ActiveTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "active-tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn phase_advance_marks_active_and_completion_clears() {
        let tracker = ActiveTracker::new();

        let start = Event::now(EventKind::PhaseAdvanced).with_task("t1");
        let done = Event::now(EventKind::TaskCompleted).with_task("t1");

        assert!(tracker.update(&start).await);
        assert_eq!(tracker.snapshot().await, vec![TaskId::from("t1")]);

        assert!(tracker.update(&done).await);
        assert!(tracker.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn stale_phase_events_are_rejected() {
        let tracker = ActiveTracker::new();

        let older = Event::now(EventKind::PhaseAdvanced).with_task("t1");
        let newer = Event::now(EventKind::PhaseAdvanced).with_task("t1");

        // Deliver out of order: the newer phase write lands first.
        assert!(tracker.update(&newer).await);
        assert!(!tracker.update(&older).await); // stale, rejected
        assert_eq!(tracker.active_count().await, 1);
    }

    #[tokio::test]
    async fn unrelated_events_do_not_change_state() {
        let tracker = ActiveTracker::new();
        let ev = Event::now(EventKind::TaskCreated).with_task("t1");
        assert!(!tracker.update(&ev).await);
        assert_eq!(tracker.active_count().await, 0);
    }

    #[tokio::test]
    async fn finished_tasks_leave_no_state_behind() {
        let tracker = ActiveTracker::new();

        for n in 0..32 {
            let task = format!("t{n}");
            let start = Event::now(EventKind::PhaseAdvanced).with_task(task.as_str());
            let done = if n % 2 == 0 {
                Event::now(EventKind::TaskCompleted).with_task(task.as_str())
            } else {
                Event::now(EventKind::TaskVanished).with_task(task.as_str())
            };
            tracker.update(&start).await;
            tracker.update(&done).await;
        }

        assert_eq!(tracker.active_count().await, 0);
        assert!(tracker.state.read().await.is_empty());
    }
}

//! # Worker: dequeue, gate, advance phases.
//!
//! Each worker is a long-lived tokio task running an unbounded loop:
//!
//! ```text
//! loop {
//!   ├─► select! { biased; shutdown → exit, dequeue() → id }
//!   │     └─ queue closed and drained → exit
//!   ├─► acquire owned permit from the global semaphore
//!   ├─► skip silently if the ID was deleted before pickup
//!   ├─► run 3 phases:
//!   │     write phase via update_phase
//!   │       ├─ Ok        → publish PhaseAdvanced
//!   │       └─ NotFound  → publish TaskVanished, abandon remaining phases
//!   │     sleep random [min, max] after the first and second phase
//!   └─► drop permit (released on every exit path), loop
//! }
//! ```
//!
//! ## Rules
//! - **No new work after shutdown**: the select is biased toward the
//!   cancellation token, so a worker observing shutdown never dequeues.
//! - **Cooperative cancellation only**: once a task enters processing, its
//!   phases (including the sleeps) run to completion; deleting the record
//!   is the only way to cut a task short, and only at a phase boundary.
//! - **Abandonment is not an error**: nobody is waiting for a deleted
//!   task's result; the worker publishes an event and moves on.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::queue::AdmissionQueue;
use crate::store::{StatusStore, TaskId};

/// One worker of the pool, identified by `index`.
pub(crate) struct Worker {
    pub(crate) index: usize,
    pub(crate) store: Arc<StatusStore>,
    pub(crate) queue: Arc<AdmissionQueue>,
    pub(crate) semaphore: Arc<Semaphore>,
    pub(crate) bus: Bus,
    /// Ordered bounds of the randomized inter-phase delay.
    pub(crate) delay_min: Duration,
    pub(crate) delay_max: Duration,
}

impl Worker {
    /// Runs the worker loop until shutdown is signaled or the queue closes.
    pub(crate) async fn run(self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }

            let id = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = self.queue.dequeue() => match next {
                    Some(id) => id,
                    None => break,
                },
            };

            // The permit drops on every path below, releasing the slot.
            let _permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_closed) => break,
            };

            if !self.store.exists(&id) {
                self.publish_vanished(&id, "deleted before pickup");
                continue;
            }

            self.run_phases(&id).await;
        }
    }

    /// Advances the task through the fixed 3-phase routine.
    ///
    /// A `NotFound` on any phase write means the task was deleted
    /// mid-processing; the remaining phases are abandoned without error.
    async fn run_phases(&self, id: &TaskId) {
        let wid = self.index;
        let phases = [
            format!("worker-{wid}: started"),
            format!("worker-{wid}: querying backing store"),
            format!("worker-{wid}: completed"),
        ];
        let last = phases.len() - 1;

        for (n, phase) in phases.iter().enumerate() {
            if self.store.update_phase(id, phase.as_str()).is_err() {
                self.publish_vanished(id, "deleted mid-processing");
                return;
            }
            self.bus.publish(
                Event::now(EventKind::PhaseAdvanced)
                    .with_task(id.as_str())
                    .with_worker(wid)
                    .with_phase(phase.as_str()),
            );

            if n < last {
                // Simulated external I/O latency. Not raced against the
                // shutdown token: a picked-up task runs to completion.
                time::sleep(self.sample_delay()).await;
            }
        }

        self.bus.publish(
            Event::now(EventKind::TaskCompleted)
                .with_task(id.as_str())
                .with_worker(wid),
        );
    }

    /// Samples a delay uniformly from `[delay_min, delay_max]`.
    fn sample_delay(&self) -> Duration {
        let lo = self.delay_min.as_millis() as u64;
        let hi = self.delay_max.as_millis() as u64;
        if lo >= hi {
            return self.delay_min;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    fn publish_vanished(&self, id: &TaskId, reason: &'static str) {
        self.bus.publish(
            Event::now(EventKind::TaskVanished)
                .with_task(id.as_str())
                .with_worker(self.index)
                .with_reason(reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_worker(
        store: Arc<StatusStore>,
        queue: Arc<AdmissionQueue>,
        bus: Bus,
    ) -> Worker {
        Worker {
            index: 0,
            store,
            queue,
            semaphore: Arc::new(Semaphore::new(1)),
            bus,
            delay_min: Duration::from_millis(1),
            delay_max: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn runs_phases_to_terminal_and_keeps_record() {
        let store = StatusStore::new();
        let queue = Arc::new(AdmissionQueue::new(4));
        let bus = Bus::new(64);

        let id = store.create("job").unwrap();
        queue.enqueue(id.clone()).unwrap();
        queue.close();

        test_worker(Arc::clone(&store), queue, bus)
            .run(CancellationToken::new())
            .await;

        let snap = store.get(&id).unwrap();
        assert_eq!(snap.phase, "worker-0: completed");
        assert_eq!(snap.name, "job");
    }

    #[tokio::test]
    async fn deleted_before_pickup_is_skipped_silently() {
        let store = StatusStore::new();
        let queue = Arc::new(AdmissionQueue::new(4));
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();

        let id = store.create("short-lived").unwrap();
        queue.enqueue(id.clone()).unwrap();
        store.delete(&id).unwrap();
        queue.close();

        test_worker(Arc::clone(&store), queue, bus)
            .run(CancellationToken::new())
            .await;

        assert!(!store.exists(&id));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TaskVanished);
        assert_eq!(ev.reason.as_deref(), Some("deleted before pickup"));
    }

    #[tokio::test]
    async fn cancelled_worker_does_not_pick_up_queued_work() {
        let store = StatusStore::new();
        let queue = Arc::new(AdmissionQueue::new(4));
        let bus = Bus::new(64);

        let id = store.create("never-picked").unwrap();
        queue.enqueue(id.clone()).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        test_worker(Arc::clone(&store), queue, bus).run(token).await;

        // Record untouched: still pending.
        assert_eq!(store.get(&id).unwrap().phase, crate::store::PHASE_PENDING);
    }

    #[tokio::test]
    async fn fixed_delay_bounds_collapse_to_min() {
        let store = StatusStore::new();
        let queue = Arc::new(AdmissionQueue::new(1));
        let worker = test_worker(store, queue, Bus::new(1));
        let worker = Worker {
            delay_min: Duration::from_millis(7),
            delay_max: Duration::from_millis(7),
            ..worker
        };
        assert_eq!(worker.sample_delay(), Duration::from_millis(7));
    }
}

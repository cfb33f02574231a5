//! # Admission queue: fixed-capacity FIFO of task IDs.
//!
//! ```text
//! callers ── enqueue(id) ──► [bounded mpsc] ──► dequeue() ── workers
//!              (try_send,      capacity N          (shared receiver,
//!               fail fast)                          blocks when empty)
//! ```
//!
//! ## Rules
//! - **Non-blocking admission**: `enqueue` uses `try_send` and fails fast
//!   with `QueueFull` at capacity; producers are never parked on
//!   backpressure.
//! - **FIFO**: admitted IDs are dequeued in admission order.
//! - **Single close**: only the pool closes the queue, once, during
//!   shutdown; blocked `dequeue` calls then unblock with `None` after the
//!   remaining IDs drain.

use std::sync::RwLock;

use tokio::sync::{Mutex, mpsc};

use crate::error::AdmitError;
use crate::store::TaskId;

/// Bounded FIFO channel of task IDs between admission and the worker pool.
///
/// The sender side lives behind a sync `RwLock` so `enqueue` stays callable
/// from non-async code; the receiver side is shared by all workers through
/// an async `Mutex` (held only across a single `recv`).
pub(crate) struct AdmissionQueue {
    tx: RwLock<Option<mpsc::Sender<TaskId>>>,
    rx: Mutex<mpsc::Receiver<TaskId>>,
}

impl AdmissionQueue {
    /// Creates a queue holding at most `capacity` IDs.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx: RwLock::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }

    /// Admits `id` without blocking.
    ///
    /// Fails with [`AdmitError::QueueFull`] immediately when the queue is at
    /// capacity, or [`AdmitError::Closed`] after shutdown closed the queue.
    pub(crate) fn enqueue(&self, id: TaskId) -> Result<(), AdmitError> {
        let tx = self.tx.read().unwrap_or_else(|e| e.into_inner());
        match tx.as_ref() {
            Some(sender) => sender.try_send(id).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => AdmitError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => AdmitError::Closed,
            }),
            None => Err(AdmitError::Closed),
        }
    }

    /// Waits for the next admitted ID.
    ///
    /// Returns `None` once the queue has been closed and drained — the
    /// closed-signal workers use to exit their loop.
    pub(crate) async fn dequeue(&self) -> Option<TaskId> {
        self.rx.lock().await.recv().await
    }

    /// Returns true once the queue has been closed.
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.read().unwrap_or_else(|e| e.into_inner()).is_none()
    }

    /// Closes the queue; idempotent.
    ///
    /// Dropping the sender unblocks pending `dequeue` calls with `None`
    /// after the already-admitted IDs are drained.
    pub(crate) fn close(&self) {
        self.tx.write().unwrap_or_else(|e| e.into_inner()).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dequeues_in_admission_order() {
        let queue = AdmissionQueue::new(8);
        let ids: Vec<TaskId> = (0..4).map(|n| TaskId::from(format!("id-{n}"))).collect();
        for id in &ids {
            queue.enqueue(id.clone()).unwrap();
        }
        for id in &ids {
            assert_eq!(queue.dequeue().await.as_ref(), Some(id));
        }
    }

    #[tokio::test]
    async fn enqueue_past_capacity_fails_fast() {
        let queue = AdmissionQueue::new(3);
        for n in 0..3 {
            queue.enqueue(TaskId::from(format!("id-{n}"))).unwrap();
        }
        assert_eq!(
            queue.enqueue(TaskId::from("overflow")),
            Err(AdmitError::QueueFull)
        );
        // Draining one slot makes room again.
        assert!(queue.dequeue().await.is_some());
        queue.enqueue(TaskId::from("retried")).unwrap();
    }

    #[tokio::test]
    async fn close_drains_then_signals_end() {
        let queue = AdmissionQueue::new(4);
        queue.enqueue(TaskId::from("queued-before-close")).unwrap();
        queue.close();

        assert_eq!(
            queue.dequeue().await,
            Some(TaskId::from("queued-before-close"))
        );
        assert_eq!(queue.dequeue().await, None);
    }

    #[tokio::test]
    async fn enqueue_after_close_is_rejected() {
        let queue = AdmissionQueue::new(4);
        queue.close();
        queue.close(); // idempotent
        assert_eq!(queue.enqueue(TaskId::from("late")), Err(AdmitError::Closed));
    }

    #[tokio::test]
    async fn close_unblocks_a_waiting_dequeue() {
        let queue = std::sync::Arc::new(AdmissionQueue::new(1));
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.dequeue().await })
        };
        tokio::task::yield_now().await;
        queue.close();
        assert_eq!(waiter.await.unwrap(), None);
    }
}

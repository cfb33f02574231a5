//! # TaskPool: lifecycle controller and facade.
//!
//! The [`TaskPool`] owns every moving part of the pipeline — status store,
//! admission queue, worker set, concurrency semaphore, event bus — and
//! exposes the operations the serving layer calls.
//!
//! ## Lifecycle
//! ```text
//! Stopped ── start() ──► Running ── shutdown(deadline) ──► Draining ──► Stopped
//!
//! start():
//!   - fresh CancellationToken
//!   - fresh admission queue if a previous shutdown closed it
//!   - spawn N workers into a JoinSet, each with a child token
//!
//! shutdown(deadline):
//!   - publish ShutdownRequested
//!   - cancel the token          → no worker picks up new work
//!   - close the admission queue → blocked dequeues unblock with None
//!   - wait for the JoinSet under timeout(deadline)
//!       ├─ all joined  → DrainedWithinDeadline, Ok(())
//!       └─ timed out   → DrainTimedOut, Err(DrainTimeout { deadline, stuck })
//!         (remaining workers are detached, never aborted; the store stays
//!          inspectable and each task keeps its last-written phase)
//! ```
//!
//! ## Rules
//! - State transitions are guarded by a mutex; `start()` on a non-stopped
//!   pool fails with `AlreadyRunning`, `shutdown()` on a non-running pool
//!   with `NotRunning`.
//! - The pool transitions to `Stopped` after shutdown **regardless** of the
//!   drain outcome; a timeout is reported, not fatal.
//! - Only the pool closes the admission queue, and only once per run.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::error::{AdmitError, PoolError, StoreError};
use crate::events::{Bus, Event, EventKind};
use crate::queue::AdmissionQueue;
use crate::store::{StatusStore, TaskId, TaskSnapshot};
use crate::subscribers::{ActiveTracker, SubscriberSet};

use super::builder::TaskPoolBuilder;
use super::worker::Worker;

/// Lifecycle state of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// No workers running; admission still queues IDs for a later start.
    Stopped,
    /// Workers are processing admitted IDs.
    Running,
    /// Shutdown in progress; waiting for in-flight work to finish.
    Draining,
}

/// Mutable lifecycle internals, guarded by one mutex.
struct Lifecycle {
    state: PoolState,
    token: Option<CancellationToken>,
    workers: Option<JoinSet<()>>,
}

/// Bounded-concurrency task pipeline.
///
/// Construct via [`TaskPool::builder`] (or [`TaskPool::new`] without
/// subscribers), then `start()` once at process startup and
/// `shutdown()` once at process shutdown.
pub struct TaskPool {
    cfg: PoolConfig,
    store: Arc<StatusStore>,
    bus: Bus,
    tracker: Arc<ActiveTracker>,
    semaphore: Arc<Semaphore>,
    // Replaced on restart after a shutdown closed the previous queue.
    queue: RwLock<Arc<AdmissionQueue>>,
    lifecycle: Mutex<Lifecycle>,
    // Keeps the subscriber workers alive for the pool's lifetime.
    _subs: Arc<SubscriberSet>,
}

impl TaskPool {
    /// Returns a builder for a pool with the given configuration.
    pub fn builder(cfg: PoolConfig) -> TaskPoolBuilder {
        TaskPoolBuilder::new(cfg)
    }

    /// Builds a pool with no extra subscribers.
    ///
    /// Must be called within a tokio runtime (subscriber workers and the
    /// fan-out listener are spawned immediately).
    pub fn new(cfg: PoolConfig) -> Arc<Self> {
        Self::builder(cfg).build()
    }

    pub(super) fn from_parts(
        cfg: PoolConfig,
        store: Arc<StatusStore>,
        bus: Bus,
        tracker: Arc<ActiveTracker>,
        subs: Arc<SubscriberSet>,
    ) -> Arc<Self> {
        let semaphore = Arc::new(Semaphore::new(cfg.concurrency_limit().max(1)));
        let queue = Arc::new(AdmissionQueue::new(cfg.queue_capacity));

        Arc::new(Self {
            cfg,
            store,
            bus,
            tracker,
            semaphore,
            queue: RwLock::new(queue),
            lifecycle: Mutex::new(Lifecycle {
                state: PoolState::Stopped,
                token: None,
                workers: None,
            }),
            _subs: subs,
        })
    }

    // ---------------------------
    // Facade for the serving layer
    // ---------------------------

    /// Allocates a fresh task ID and inserts a `pending` record.
    ///
    /// Fails with [`StoreError::InvalidInput`] on an empty name.
    pub fn create_task(&self, name: &str) -> Result<TaskId, StoreError> {
        let id = self.store.create(name)?;
        self.bus
            .publish(Event::now(EventKind::TaskCreated).with_task(id.as_str()));
        Ok(id)
    }

    /// Places `id` onto the admission queue without blocking.
    ///
    /// Fails fast with [`AdmitError::QueueFull`] when the queue is
    /// saturated — the caller propagates the rejection to its own caller.
    pub fn admit(&self, id: &TaskId) -> Result<(), AdmitError> {
        match self.queue().enqueue(id.clone()) {
            Ok(()) => {
                self.bus
                    .publish(Event::now(EventKind::TaskAdmitted).with_task(id.as_str()));
                Ok(())
            }
            Err(err) => {
                self.bus.publish(
                    Event::now(EventKind::AdmitRejected)
                        .with_task(id.as_str())
                        .with_reason(err.as_label()),
                );
                Err(err)
            }
        }
    }

    /// Returns true if a record exists for `id`.
    pub fn task_exists(&self, id: &TaskId) -> bool {
        self.store.exists(id)
    }

    /// Returns a snapshot of the task's record, including elapsed time.
    pub fn task_status(&self, id: &TaskId) -> Result<TaskSnapshot, StoreError> {
        self.store.get(id)
    }

    /// Deletes the task's record.
    ///
    /// Legal at any point of the task's life, including mid-processing: the
    /// assigned worker discovers the absence at its next phase write and
    /// abandons the remaining phases.
    pub fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        self.store.delete(id)?;
        self.bus
            .publish(Event::now(EventKind::TaskDeleted).with_task(id.as_str()));
        Ok(())
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Spawns the worker set; transitions `Stopped → Running`.
    ///
    /// Fails with [`PoolError::AlreadyRunning`] unless the pool is stopped.
    pub fn start(&self) -> Result<(), PoolError> {
        let mut lc = self.lock_lifecycle();
        if lc.state != PoolState::Stopped {
            return Err(PoolError::AlreadyRunning);
        }

        // A previous shutdown closed the queue; replace it so re-admission
        // works. IDs admitted before the first start stay queued.
        {
            let mut queue = self.queue.write().unwrap_or_else(|e| e.into_inner());
            if queue.is_closed() {
                *queue = Arc::new(AdmissionQueue::new(self.cfg.queue_capacity));
            }
        }

        let token = CancellationToken::new();
        let mut workers = JoinSet::new();
        let queue = self.queue();
        let (delay_min, delay_max) = self.cfg.phase_delay_bounds();

        for index in 0..self.cfg.workers.max(1) {
            let worker = Worker {
                index,
                store: Arc::clone(&self.store),
                queue: Arc::clone(&queue),
                semaphore: Arc::clone(&self.semaphore),
                bus: self.bus.clone(),
                delay_min,
                delay_max,
            };
            workers.spawn(worker.run(token.child_token()));
        }

        lc.state = PoolState::Running;
        lc.token = Some(token);
        lc.workers = Some(workers);
        Ok(())
    }

    /// Drains the pool within the configured default grace period.
    ///
    /// See [`shutdown_within`](Self::shutdown_within).
    pub async fn shutdown(&self) -> Result<(), PoolError> {
        self.shutdown_within(self.cfg.grace).await
    }

    /// Drains the pool within `deadline`; transitions
    /// `Running → Draining → Stopped`.
    ///
    /// Broadcasts cancellation (no worker picks up new work), closes the
    /// admission queue (blocked dequeues unblock), then waits for every
    /// worker. On timeout, returns [`PoolError::DrainTimeout`] listing the
    /// task IDs still inside their phase routine; the remaining workers are
    /// detached, never aborted, and the pool still transitions to
    /// `Stopped`.
    pub async fn shutdown_within(&self, deadline: Duration) -> Result<(), PoolError> {
        let (token, workers) = {
            let mut lc = self.lock_lifecycle();
            if lc.state != PoolState::Running {
                return Err(PoolError::NotRunning);
            }
            lc.state = PoolState::Draining;
            (lc.token.take(), lc.workers.take())
        };

        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        if let Some(token) = token {
            token.cancel();
        }
        self.queue().close();

        let mut workers = workers.unwrap_or_default();
        let drained = time::timeout(deadline, async {
            while workers.join_next().await.is_some() {}
        })
        .await;

        // Stopped regardless of the drain outcome.
        self.lock_lifecycle().state = PoolState::Stopped;

        match drained {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::DrainedWithinDeadline));
                Ok(())
            }
            Err(_elapsed) => {
                // Detach instead of dropping: dropping a JoinSet aborts its
                // tasks, and the controller never hard-kills workers.
                workers.detach_all();
                self.bus
                    .publish(Event::now(EventKind::DrainTimedOut).with_delay(deadline));
                let stuck = self.tracker.snapshot().await;
                Err(PoolError::DrainTimeout { deadline, stuck })
            }
        }
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Returns the current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.lock_lifecycle().state
    }

    /// The underlying status store.
    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// The tracker of tasks currently inside their phase routine.
    pub fn tracker(&self) -> &Arc<ActiveTracker> {
        &self.tracker
    }

    /// The event bus; subscribe for ad-hoc observation.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    fn queue(&self) -> Arc<AdmissionQueue> {
        Arc::clone(&self.queue.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

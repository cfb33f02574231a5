//! # phasepool
//!
//! **phasepool** is a bounded-concurrency task processing pipeline:
//! a fixed-capacity admission queue, a capped pool of workers that advance
//! tasks through a fixed multi-phase routine, a shared status store readable
//! at any time, and a coordinated graceful drain with a deadline.
//!
//! ## Architecture
//! ```text
//!  caller ── create_task(name) ──► StatusStore (record: pending)
//!  caller ── admit(id) ──────────► AdmissionQueue (bounded FIFO, fail-fast)
//!                                        │
//!                       ┌────────────────┼────────────────┐
//!                       ▼                ▼                ▼
//!                  ┌─────────┐      ┌─────────┐      ┌─────────┐
//!                  │ worker-0│      │ worker-1│ ...  │ worker-N│
//!                  └────┬────┘      └────┬────┘      └────┬────┘
//!                       │  acquire global semaphore slot  │
//!                       │  phase 1 → sleep → phase 2 → sleep → phase 3
//!                       ▼                ▼                ▼
//!                  update_phase() ──► StatusStore ◄── get()/delete() callers
//!                       │
//!                       └── publish(Event) ──► Bus ──► SubscriberSet
//!                                                   (ActiveTracker, LogWriter, ...)
//!
//!  Shutdown path:
//!    shutdown(deadline)
//!        ├─► cancel token        → no worker picks up new work
//!        ├─► close queue         → blocked dequeues unblock with None
//!        └─► wait under deadline
//!              ├─ drained  → Ok, DrainedWithinDeadline
//!              └─ timeout  → Err(DrainTimeout { deadline, stuck }),
//!                            workers detached (never aborted)
//! ```
//!
//! ## Guarantees
//! - **Backpressure is explicit**: admission never blocks; a saturated
//!   queue rejects with [`AdmitError::QueueFull`].
//! - **Bounded concurrency**: at most the configured cap of tasks are
//!   inside their phase routine at any instant.
//! - **Deletion is the task-level cancel**: a record may be deleted at any
//!   point; the assigned worker notices at the next phase boundary and
//!   abandons the rest without error.
//! - **Drain is cooperative**: a picked-up task runs its phases to
//!   completion; the deadline only bounds how long `shutdown` waits before
//!   reporting a timeout. No worker is ever hard-killed.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use phasepool::{PoolConfig, TaskPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = PoolConfig {
//!         workers: 5,
//!         queue_capacity: 100,
//!         phase_delay_min: Duration::from_millis(60),
//!         phase_delay_max: Duration::from_millis(100),
//!         ..PoolConfig::default()
//!     };
//!     let pool = TaskPool::new(cfg);
//!     pool.start()?;
//!
//!     let id = pool.create_task("nightly report")?;
//!     pool.admit(&id)?;
//!
//!     tokio::time::sleep(Duration::from_millis(500)).await;
//!     println!("{:?}", pool.task_status(&id)?);
//!
//!     pool.shutdown_within(Duration::from_secs(5)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.

mod config;
mod error;
mod events;
mod pool;
mod queue;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use config::PoolConfig;
pub use error::{AdmitError, PoolError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use pool::{PoolState, TaskPool, TaskPoolBuilder};
pub use store::{PHASE_PENDING, StatusStore, TaskId, TaskSnapshot};
pub use subscribers::{ActiveTracker, Subscribe, SubscriberSet};

// Optional: a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

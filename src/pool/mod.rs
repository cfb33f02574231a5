//! # Worker pool and lifecycle controller.
//!
//! This module contains the processing half of the pipeline:
//! - [`worker`]: the per-worker loop — dequeue, gate on the concurrency
//!   semaphore, run the fixed multi-phase routine, tolerate deletion;
//! - [`builder`]: wires bus, subscribers, tracker, store, and queue;
//! - [`pool`]: the [`TaskPool`] state machine
//!   (`Stopped → Running → Draining → Stopped`) and the facade the serving
//!   layer calls.

mod builder;
mod pool;
mod worker;

pub use builder::TaskPoolBuilder;
pub use pool::{PoolState, TaskPool};

//! Error types used by the status store, the admission queue, and the pool.
//!
//! This module defines three error enums, split by producer:
//!
//! - [`StoreError`] — errors raised by [`StatusStore`](crate::StatusStore) operations.
//! - [`AdmitError`] — admission rejections from the bounded queue.
//! - [`PoolError`] — errors raised by the pool lifecycle (start/shutdown).
//!
//! All of them are recovered at the boundary between the core and its
//! caller: none of them crashes a worker or corrupts the store. A worker
//! that hits [`StoreError::NotFound`] mid-processing treats it as expected
//! control flow (the task was deleted) rather than a failure.

use std::time::Duration;

use thiserror::Error;

use crate::store::TaskId;

/// # Errors produced by [`StatusStore`](crate::StatusStore) operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Task creation was given an empty name.
    #[error("task name must not be empty")]
    InvalidInput,

    /// No record exists for the given task ID.
    #[error("task {id} not found")]
    NotFound {
        /// The ID that was looked up.
        id: TaskId,
    },

    /// A freshly generated ID collided with an existing record.
    ///
    /// Defensive only: v4 UUID generation makes this unreachable in
    /// practice, but the store still refuses to overwrite a live record.
    #[error("task {id} already present")]
    Conflict {
        /// The colliding ID.
        id: TaskId,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::InvalidInput => "store_invalid_input",
            StoreError::NotFound { .. } => "store_not_found",
            StoreError::Conflict { .. } => "store_conflict",
        }
    }
}

/// # Admission rejections from the bounded queue.
///
/// Callers are never blocked by backpressure; saturation is reported
/// immediately so the caller can propagate its own rejection.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitError {
    /// The admission queue is at capacity.
    #[error("admission queue full")]
    QueueFull,

    /// The admission queue was closed by shutdown; no further IDs are accepted.
    #[error("admission queue closed")]
    Closed,
}

impl AdmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AdmitError::QueueFull => "admit_queue_full",
            AdmitError::Closed => "admit_queue_closed",
        }
    }
}

/// # Errors produced by the pool lifecycle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `start()` was called while the pool was already running or draining.
    #[error("pool already running")]
    AlreadyRunning,

    /// `shutdown()` was called while the pool was not running.
    #[error("pool not running")]
    NotRunning,

    /// The drain deadline elapsed before every worker finished.
    ///
    /// Reported, not fatal: remaining workers keep running detached and the
    /// store stays inspectable. `stuck` lists the task IDs that were still
    /// inside their phase routine when the deadline fired.
    #[error("drain deadline {deadline:?} exceeded; stuck: {stuck:?}")]
    DrainTimeout {
        /// The deadline that was exceeded.
        deadline: Duration,
        /// Task IDs still being processed when the deadline fired.
        stuck: Vec<TaskId>,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::AlreadyRunning => "pool_already_running",
            PoolError::NotRunning => "pool_not_running",
            PoolError::DrainTimeout { .. } => "pool_drain_timeout",
        }
    }
}

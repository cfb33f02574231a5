//! # Status store: shared task state, readable at any time.
//!
//! The store is the only shared mutable resource in the pipeline. Every
//! component goes through its lock-guarded operations:
//!
//! ```text
//! admission path ── create() ──►┌─────────────────┐
//! workers ──── update_phase() ──►│   StatusStore   │◄── get()/exists() ── readers
//! callers ──────── delete() ───►│ RwLock<HashMap> │
//!                               └─────────────────┘
//! ```
//!
//! ## Rules
//! - The lock is held only for the duration of the map access; no I/O or
//!   sleeping while held.
//! - A record exists from the moment `create` succeeds until explicit
//!   `delete`; the store never auto-deletes finished tasks.
//! - Deletion may race an in-flight `update_phase`; the later operation
//!   wins (`update_phase` on a just-deleted ID returns `NotFound`).

mod record;
mod status;

pub use record::{PHASE_PENDING, TaskId, TaskSnapshot};
pub use status::StatusStore;

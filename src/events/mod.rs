//! # Runtime events published by the pipeline.
//!
//! ```text
//! Event flow:
//!   pool / workers ── publish(Event) ──► Bus ──► fan-out listener
//!                                                    │
//!                                               SubscriberSet
//!                                              ┌──────┼──────┐
//!                                              ▼      ▼      ▼
//!                                         LogWriter  ActiveTracker  custom
//! ```
//!
//! Events are observability only: the pipeline's correctness never depends
//! on their delivery (the bus is fire-and-forget).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

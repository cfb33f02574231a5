//! # Event subscribers for the pipeline.
//!
//! Provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out, and two
//! built-in subscribers:
//! - [`ActiveTracker`] — stateful; tracks which task IDs are currently
//!   inside their phase routine (feeds the drain-timeout report).
//! - `LogWriter` (feature `logging`) — prints events to stdout, demo only.
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for that subscriber only** and
//!   publishes `SubscriberOverflow`.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers never block publishers or each other.

mod active;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use active::ActiveTracker;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;

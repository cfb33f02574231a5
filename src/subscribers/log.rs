//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [created] task="5b3f..."
//! [admitted] task="5b3f..."
//! [phase] task="5b3f..." worker=2 phase="worker-2: started"
//! [vanished] task="5b3f..." worker=2 reason="deleted mid-processing"
//! [completed] task="5b3f..." worker=2
//! [shutdown-requested]
//! [drained-within-deadline]
//! [drain-timed-out] deadline_ms=5000
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Constructs a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskCreated => {
                println!("[created] task={:?}", e.task);
            }
            EventKind::TaskAdmitted => {
                println!("[admitted] task={:?}", e.task);
            }
            EventKind::AdmitRejected => {
                println!("[admit-rejected] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::PhaseAdvanced => {
                println!(
                    "[phase] task={:?} worker={:?} phase={:?}",
                    e.task, e.worker, e.phase
                );
            }
            EventKind::TaskVanished => {
                println!(
                    "[vanished] task={:?} worker={:?} reason={:?}",
                    e.task, e.worker, e.reason
                );
            }
            EventKind::TaskCompleted => {
                println!("[completed] task={:?} worker={:?}", e.task, e.worker);
            }
            EventKind::TaskDeleted => {
                println!("[deleted] task={:?}", e.task);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::DrainedWithinDeadline => {
                println!("[drained-within-deadline]");
            }
            EventKind::DrainTimedOut => {
                println!("[drain-timed-out] deadline_ms={:?}", e.delay_ms);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.task, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.task.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

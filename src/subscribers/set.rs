//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ```text
//! emit(event)
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N
//!   while B is still on N-5.
//! - **Overflow**: the event is dropped for that subscriber only and a
//!   `SubscriberOverflow` is published (overflow events themselves are
//!   never re-published on overflow, to avoid loops).
//! - **Per-subscriber FIFO**; `emit()` itself never blocks.
//! - **Teardown by drop**: dropping the set closes every queue; each worker
//!   drains its remaining events and exits.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event subscribers.
///
/// Manages per-subscriber queues and worker tasks: concurrent delivery,
/// isolation, panic safety, overflow reporting.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker task per subscriber.
    ///
    /// The workers run until the set is dropped and their queues drain.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();

            tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(&*panic_err);
                        bus_for_worker.publish(Event::subscriber_panicked(sub.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self { channels, bus }
    }

    /// Emits an event to all subscribers (clones it into an `Arc`).
    ///
    /// Non-blocking: uses `try_send` per queue; on a full or closed queue
    /// the event is dropped for that subscriber and a `SubscriberOverflow`
    /// is published.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    async fn wait_for_count(counter: &Counter, expected: usize) {
        time::timeout(Duration::from_secs(1), async {
            while counter.0.load(Ordering::SeqCst) < expected {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscriber never processed the expected events");
    }

    #[tokio::test]
    async fn events_reach_every_subscriber() {
        let bus = Bus::new(16);
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let subs: Vec<Arc<dyn Subscribe>> = vec![counter.clone()];
        let set = SubscriberSet::new(subs, bus);

        for _ in 0..5 {
            set.emit(&Event::now(EventKind::TaskCreated));
        }

        wait_for_count(&counter, 5).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn panicking_subscriber_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicky), counter.clone()];
        let set = SubscriberSet::new(subs, bus);

        set.emit(&Event::now(EventKind::TaskCreated));

        // The healthy subscriber still sees the event.
        wait_for_count(&counter, 1).await;

        // The panic was reported on the bus.
        let reported = time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reported.kind, EventKind::SubscriberPanicked);
        assert_eq!(reported.task.as_deref(), Some("panicky"));
        drop(set);
    }
}

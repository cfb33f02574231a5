//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (workers, the
//! admission path, the pool).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events are dropped if nobody is subscribed at send
//!   time. The pipeline's behavior never depends on delivery.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); multiple
/// publishers may publish concurrently, and each subscriber receives its
/// own clone of every event.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to >= 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped; this function
    /// returns immediately either way.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// Each call creates an independent receiver; it only sees events sent
    /// after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use crate::events::EventKind;

    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::now(EventKind::TaskCreated).with_task("a"));
        bus.publish(Event::now(EventKind::TaskAdmitted).with_task("a"));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskCreated);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskAdmitted);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = Bus::new(0); // clamped to 1
        bus.publish(Event::now(EventKind::ShutdownRequested));
    }
}

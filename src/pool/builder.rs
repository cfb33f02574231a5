//! Builder wiring the pool's components together.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::PoolConfig;
use crate::events::Bus;
use crate::store::StatusStore;
use crate::subscribers::{ActiveTracker, Subscribe, SubscriberSet};

use super::pool::TaskPool;

/// Builder for constructing a [`TaskPool`] with optional subscribers.
pub struct TaskPoolBuilder {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TaskPoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pipeline events (creation, admission, phase
    /// advances, drain outcome) through dedicated workers with bounded
    /// queues. The pool's own [`ActiveTracker`] is always added.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the pool and spawns its observability plumbing.
    ///
    /// Must be called within a tokio runtime: the subscriber workers and
    /// the bus fan-out listener are spawned here, so events published
    /// before `start()` (creation, admission) are observed too.
    pub fn build(self) -> Arc<TaskPool> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let tracker = Arc::new(ActiveTracker::new());

        let mut subscribers = self.subscribers;
        subscribers.push(Arc::clone(&tracker) as Arc<dyn Subscribe>);
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        // Fan-out listener: bus → subscriber set, fire-and-forget.
        {
            let mut rx = bus.subscribe();
            let subs = Arc::clone(&subs);
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => subs.emit(&ev),
                        Err(broadcast::error::RecvError::Closed) => break,
                        // Skip over the dropped items and keep listening.
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            });
        }

        TaskPool::from_parts(self.cfg, StatusStore::new(), bus, tracker, subs)
    }
}

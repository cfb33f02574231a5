//! # Global pool configuration.
//!
//! Provides [`PoolConfig`], the centralized settings for the processing
//! pipeline: worker count, admission capacity, concurrency cap, simulated
//! phase delays, event bus capacity, and the default drain deadline.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → the semaphore mirrors `workers`
//! - `bus_capacity` is clamped to a minimum of 1 by the Bus

use std::time::Duration;

/// Global configuration for the task pool.
///
/// ## Field semantics
/// - `workers`: number of long-lived worker tasks
/// - `queue_capacity`: admission queue size; `enqueue` past this fails fast
/// - `max_concurrent`: global cap on tasks inside the phase routine
///   (`0` = same as `workers`)
/// - `phase_delay_min` / `phase_delay_max`: bounds of the uniformly random
///   sleep between phases (simulated external I/O latency)
/// - `bus_capacity`: event bus ring buffer size
/// - `grace`: default drain deadline used by [`TaskPool::shutdown`](crate::TaskPool::shutdown)
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker tasks to spawn.
    pub workers: usize,

    /// Capacity of the admission queue.
    ///
    /// Producers are never blocked: once the queue holds this many IDs,
    /// further admissions fail with `AdmitError::QueueFull`.
    pub queue_capacity: usize,

    /// Maximum number of tasks simultaneously inside their phase routine.
    ///
    /// - `0` = mirror `workers` (the default; the semaphore then simply
    ///   tracks pool occupancy)
    /// - `n > 0` = at most `n` concurrent phase executions, independent of
    ///   the worker count
    pub max_concurrent: usize,

    /// Lower bound of the randomized inter-phase delay.
    pub phase_delay_min: Duration,

    /// Upper bound of the randomized inter-phase delay.
    pub phase_delay_max: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items. Minimum value is 1
    /// (enforced by the Bus).
    pub bus_capacity: usize,

    /// Default deadline for graceful drain.
    ///
    /// `shutdown()` waits at most this long for in-flight work before
    /// reporting `PoolError::DrainTimeout`.
    pub grace: Duration,
}

impl PoolConfig {
    /// Returns the effective concurrency cap.
    ///
    /// Resolves the `max_concurrent = 0` sentinel to `workers`.
    #[inline]
    pub fn concurrency_limit(&self) -> usize {
        if self.max_concurrent == 0 {
            self.workers
        } else {
            self.max_concurrent
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the `(min, max)` inter-phase delay bounds, ordered.
    ///
    /// Swaps the bounds if they were configured inverted, so delay sampling
    /// never panics on an empty range.
    #[inline]
    pub fn phase_delay_bounds(&self) -> (Duration, Duration) {
        if self.phase_delay_min <= self.phase_delay_max {
            (self.phase_delay_min, self.phase_delay_max)
        } else {
            (self.phase_delay_max, self.phase_delay_min)
        }
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `workers = 5`
    /// - `queue_capacity = 100`
    /// - `max_concurrent = 0` (mirror `workers`)
    /// - `phase_delay_min = 60s`, `phase_delay_max = 100s`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            workers: 5,
            queue_capacity: 100,
            max_concurrent: 0,
            phase_delay_min: Duration::from_secs(60),
            phase_delay_max: Duration::from_secs(100),
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

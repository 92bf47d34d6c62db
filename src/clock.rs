//! Monotonic time source and task sleep.
//!
//! Every task takes its timestamps and performs its fixed delays through a
//! [`Clock`], so the back-off, monitor delay and heartbeat cadence can be
//! driven deterministically in tests with [`ManualClock`].

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// Monotonic microsecond clock with a cooperative sleep.
pub trait Clock: Send + Sync {
    /// Microseconds since the clock's epoch (boot).
    fn now_us(&self) -> u64;

    /// Suspend the calling task for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall-clock backed [`Clock`]; the epoch is the moment of construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated [`Clock`] for tests: `sleep` advances time instantly and is
/// recorded.
///
/// Every sleep is kept until the clock is dropped, so this is a test double
/// only. Handing it to a task's `run` loop grows the sleep log without bound;
/// production code uses [`MonotonicClock`].
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time.
    pub fn set_us(&self, now_us: u64) {
        self.now_us.store(now_us, Ordering::SeqCst);
    }

    /// Advance the current time without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        self.now_us
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    /// Total time spent sleeping.
    pub fn slept(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
    }
}

//! Traffic counters and the health snapshot.
//!
//! Each counter has exactly one writer: the task producing the corresponding
//! event. The health reporter only reads them. Counts are used for display, not
//! for control decisions, so all accesses are `Relaxed`.

use core::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::record::Direction;

/// Per-category event counters plus the storage readiness latch.
#[derive(Debug, Default)]
pub struct Counters {
    monitored: AtomicU64,
    forwarded_a_to_b: AtomicU64,
    forwarded_b_to_a: AtomicU64,
    storage_ready: AtomicBool,
}

impl Counters {
    /// All counters at zero, storage not ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame received on the monitored bus; returns the new total.
    pub fn record_monitored(&self) -> u64 {
        self.monitored.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Count a successful forward in `direction`; returns the new total.
    pub fn record_forward(&self, direction: Direction) -> u64 {
        let counter = match direction {
            Direction::AToB => &self.forwarded_a_to_b,
            Direction::BToA => &self.forwarded_b_to_a,
        };
        counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Latch storage as ready. Called once at startup; there is no way back.
    pub fn mark_storage_ready(&self) {
        self.storage_ready.store(true, Ordering::Release);
    }

    /// Frames received on the monitored bus.
    pub fn monitored(&self) -> u64 {
        self.monitored.load(Ordering::Relaxed)
    }

    /// Successful forwards in `direction`.
    pub fn forwarded(&self, direction: Direction) -> u64 {
        match direction {
            Direction::AToB => self.forwarded_a_to_b.load(Ordering::Relaxed),
            Direction::BToA => self.forwarded_b_to_a.load(Ordering::Relaxed),
        }
    }

    /// Whether storage came up at startup.
    pub fn storage_ready(&self) -> bool {
        self.storage_ready.load(Ordering::Acquire)
    }

    /// Materialise a health snapshot.
    pub fn snapshot(&self, heartbeat_on: bool) -> HealthStatus {
        HealthStatus {
            heartbeat_on,
            monitored: self.monitored(),
            forwarded_a_to_b: self.forwarded(Direction::AToB),
            forwarded_b_to_a: self.forwarded(Direction::BToA),
            storage_ready: self.storage_ready(),
        }
    }
}

/// Point-in-time view of the bridge's health. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthStatus {
    /// Heartbeat indicator state at report time
    pub heartbeat_on: bool,
    /// Frames received on the monitored bus
    pub monitored: u64,
    /// Frames forwarded from A to B
    pub forwarded_a_to_b: u64,
    /// Frames forwarded from B to A
    pub forwarded_b_to_a: u64,
    /// Whether storage initialised at startup
    pub storage_ready: bool,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LED={}, CAN2_MSG={}, BRIDGE_1->3={}, BRIDGE_3->1={}, SD={}",
            if self.heartbeat_on { "ON" } else { "OFF" },
            self.monitored,
            self.forwarded_a_to_b,
            self.forwarded_b_to_a,
            if self.storage_ready { "OK" } else { "FAIL" },
        )
    }
}

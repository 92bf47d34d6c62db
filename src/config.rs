//! Build-time configuration.
//!
//! Nothing here is read from files or the environment: bit rate, queue
//! capacity, task priorities, flush cadence and pin assignments are fixed when
//! the crate is built. [`Config::default`] is the production configuration;
//! tests shorten [`Timing`] values to keep wall-clock waits small.

use core::time::Duration;

/// Nominal bit rate shared by all three buses.
pub const CAN_BITRATE: u32 = 500_000;

/// Slots in the log queue between the bus tasks and the storage writer.
pub const LOG_QUEUE_CAPACITY: usize = 500;

/// Mount point of the removable storage volume.
pub const MOUNT_POINT: &str = "/sdcard";

/// Prefix of the per-run log table file name.
pub const TABLE_PREFIX: &str = "can_bridge";

/// GPIO driving the heartbeat indicator.
pub const STATUS_PIN: u8 = 15;

/// Relative task priority; larger values preempt smaller ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskPriority(pub u8);

impl TaskPriority {
    /// Both bridge forwarders.
    pub const BRIDGE: Self = Self(4);
    /// Monitored bus receiver.
    pub const MONITOR: Self = Self(3);
    /// Storage writer.
    pub const STORAGE: Self = Self(2);
    /// Heartbeat and health report.
    pub const HEALTH: Self = Self(1);
}

/// Controller settings for one CAN bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Interface label used in logs and in the table (`CAN1`, `CAN2`, `CAN3`)
    pub label: &'static str,
    /// Bit rate in bit/s
    pub bitrate: u32,
    /// Controller transmit queue depth
    pub tx_queue_len: usize,
    /// Controller receive queue depth
    pub rx_queue_len: usize,
    /// Transceiver TX pin
    pub tx_pin: u8,
    /// Transceiver RX pin
    pub rx_pin: u8,
}

impl BusConfig {
    /// Bridge-side bus: deep queues for sustained forwarding.
    pub const fn bridge(label: &'static str, tx_pin: u8, rx_pin: u8) -> Self {
        Self {
            label,
            bitrate: CAN_BITRATE,
            tx_queue_len: 128,
            rx_queue_len: 128,
            tx_pin,
            rx_pin,
        }
    }

    /// Monitored bus: receive-only traffic, shallow queues.
    pub const fn monitor(label: &'static str, tx_pin: u8, rx_pin: u8) -> Self {
        Self {
            label,
            bitrate: CAN_BITRATE,
            tx_queue_len: 32,
            rx_queue_len: 32,
            tx_pin,
            rx_pin,
        }
    }
}

/// Every bounded wait and cadence used by the tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// Bounded wait when forwarding a frame to the destination bus.
    pub forward_tx_timeout: Duration,
    /// Consecutive empty polls tolerated before the forwarder backs off.
    pub backoff_threshold: u32,
    /// Processor yield once the threshold is exceeded.
    pub backoff_pause: Duration,
    /// Blocking receive timeout on the monitored bus.
    pub monitor_rx_timeout: Duration,
    /// Fixed delay at the end of every monitor iteration.
    pub monitor_delay: Duration,
    /// Console lock timeout for the monitor's frame print.
    pub monitor_console_timeout: Duration,
    /// Dequeue timeout of the storage writer.
    pub queue_timeout: Duration,
    /// Storage lock timeout when appending a row.
    pub storage_lock_timeout: Duration,
    /// Storage lock timeout for the idle flush.
    pub idle_flush_lock_timeout: Duration,
    /// Rows between forced flushes.
    pub flush_every: u32,
    /// Heartbeat period.
    pub heartbeat_period: Duration,
    /// Heartbeat ticks between health reports.
    pub report_every: u32,
    /// Console lock timeout for the health report.
    pub report_console_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            forward_tx_timeout: Duration::from_millis(1),
            backoff_threshold: 10,
            backoff_pause: Duration::from_millis(1),
            monitor_rx_timeout: Duration::from_millis(100),
            monitor_delay: Duration::from_millis(5),
            monitor_console_timeout: Duration::from_millis(50),
            queue_timeout: Duration::from_secs(1),
            storage_lock_timeout: Duration::from_millis(50),
            idle_flush_lock_timeout: Duration::from_millis(5),
            flush_every: 20,
            heartbeat_period: Duration::from_secs(1),
            report_every: 10,
            report_console_timeout: Duration::from_millis(100),
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bridge side A (`CAN1`)
    pub bus_a: BusConfig,
    /// Bridge side B (`CAN3`)
    pub bus_b: BusConfig,
    /// Independently monitored bus (`CAN2`)
    pub bus_c: BusConfig,
    /// Log queue capacity
    pub queue_capacity: usize,
    /// Storage mount point
    pub mount_point: &'static str,
    /// Heartbeat indicator pin
    pub status_pin: u8,
    /// Timeouts and cadences
    pub timing: Timing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_a: BusConfig::bridge("CAN1", 16, 17),
            bus_b: BusConfig::bridge("CAN3", 20, 21),
            bus_c: BusConfig::monitor("CAN2", 18, 19),
            queue_capacity: LOG_QUEUE_CAPACITY,
            mount_point: MOUNT_POINT,
            status_pin: STATUS_PIN,
            timing: Timing::default(),
        }
    }
}

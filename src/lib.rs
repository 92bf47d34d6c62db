#![forbid(unsafe_code)]

//! # can-bridge-logger
//!
//! A bidirectional CAN bridge that forwards traffic between two buses with
//! minimal added latency, monitors a third bus independently, and records all
//! observed and forwarded frames in a SavvyCAN-compatible CSV table.
//!
//! ## Tasks
//!
//! | Task | Priority | Role |
//! |------|----------|------|
//! | `CAN1->CAN3`, `CAN3->CAN1` | highest | [`BridgeForwarder`]: poll, forward, log |
//! | `CAN2_LOG` | high | [`BusMonitor`]: receive, print, log |
//! | `SD_LOG` | low | [`StorageWriter`]: drain the log queue into the table |
//! | `LED_STATUS` | lowest | [`HealthReporter`]: heartbeat and counter snapshot |
//!
//! The forwarders never wait on anything slower than the destination bus.
//! Records reach storage through a bounded [`LogQueue`] that drops on full,
//! and the storage lock and console lock are only ever taken with a bounded
//! timeout. Every transient failure resolves to a silent drop.
//!
//! ## Quick Start
//!
//! ```no_run
//! use can_bridge_logger::can::virtual_bus;
//! use can_bridge_logger::config::Config;
//! use can_bridge_logger::health::SharedIndicator;
//! use can_bridge_logger::storage::DirectoryVolume;
//! use can_bridge_logger::{BridgeLogger, MonotonicClock, Peripherals, Result};
//!
//! fn main() -> Result<()> {
//!     let config = Config::default();
//!     let (bus_a, _wire_a) = virtual_bus(&config.bus_a);
//!     let (bus_b, _wire_b) = virtual_bus(&config.bus_b);
//!     let (bus_c, _wire_c) = virtual_bus(&config.bus_c);
//!
//!     let peripherals = Peripherals {
//!         storage: DirectoryVolume::new(config.mount_point),
//!         bus_a,
//!         bus_b,
//!         bus_c,
//!         indicator: SharedIndicator::new(),
//!     };
//!     let tasks = BridgeLogger::start(config, peripherals, MonotonicClock::new())?;
//!     tasks.join();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`can`] | Frames, the [`CanInterface`] controller trait, in-memory buses |
//! | [`bridge`] | Forwarders and the Polling/BackingOff state machine |
//! | [`monitor`] | Monitored bus task |
//! | [`queue`] | Bounded drop-on-full log queue |
//! | [`storage`] | Volume, CSV log table and the writer task |
//! | [`health`] | Heartbeat indicator and health report |
//! | [`config`] | Build-time constants and timings |
//! | [`error`] | Error types and [`Result`] alias |

pub mod bridge;
pub mod can;
pub mod clock;
pub mod config;
pub mod console;
pub mod counters;
pub mod error;
pub mod health;
pub mod monitor;
pub mod queue;
pub mod record;
pub mod storage;

mod app;

// Re-export commonly used types at the crate root
pub use app::{BridgeLogger, Peripherals, RunningTasks};
pub use bridge::{Backoff, BridgeForwarder, PollOutcome, PollState};
pub use can::{CanFrame, CanInterface};
pub use clock::{Clock, MonotonicClock};
pub use console::Console;
pub use counters::{Counters, HealthStatus};
pub use error::{Error, Result, TransmitError};
pub use health::{HealthReporter, StatusIndicator, TickOutcome};
pub use monitor::{BusMonitor, MonitorOutcome};
pub use queue::{Enqueue, LogConsumer, LogQueue, log_queue};
pub use record::{Direction, LogRecord, SourceTag};
pub use storage::{LogTable, StorageWriter};

//! Error types for bridge startup and storage operations.
//!
//! Runtime failures on the forwarding path (full queues, lock timeouts,
//! saturated transmit queues) are not errors: they resolve to a silent drop and
//! show up only as outcome values. This module covers the failures that
//! callers actually have to handle.
//!
//! # Example
//!
//! ```no_run
//! use can_bridge_logger::{Error, Result};
//!
//! fn report(result: Result<()>) {
//!     match result {
//!         Ok(()) => {}
//!         Err(Error::BusBringUp { interface, reason }) => {
//!             eprintln!("{interface} did not come up: {reason}");
//!         }
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

use thiserror::Error;

/// Errors that can occur while starting the bridge or writing the log table.
#[derive(Debug, Error)]
pub enum Error {
    /// A CAN controller could not be installed or started.
    ///
    /// Fatal for the bridge pair and the monitored bus: no task is spawned.
    #[error("failed to bring up {interface}: {reason}")]
    BusBringUp {
        /// Interface label, e.g. `CAN1`
        interface: &'static str,
        /// Driver-provided failure description
        reason: String,
    },

    /// The storage volume could not be mounted.
    ///
    /// Non-fatal: the storage writer runs in drop-only mode.
    #[error("failed to mount storage at {mount_point}: {reason}")]
    Mount {
        /// Mount point that was attempted
        mount_point: String,
        /// Why the mount failed
        reason: String,
    },

    /// An I/O error occurred while creating or appending to the log table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV writer rejected a row or failed to flush.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The OS refused to spawn one of the bridge tasks.
    #[error("failed to spawn task {name}: {source}")]
    Spawn {
        /// Task name
        name: &'static str,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a bounded-wait transmit.
///
/// The forwarder treats every variant the same way: the frame is dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// The destination transmit queue stayed full for the whole timeout.
    #[error("transmit queue full")]
    QueueFull,

    /// The controller was never started.
    #[error("bus not started")]
    NotStarted,
}

/// A specialized Result type for bridge operations.
pub type Result<T> = core::result::Result<T, Error>;

//! Bus controller abstraction consumed by the bridge tasks.

use core::time::Duration;

use super::CanFrame;
use crate::config::BusConfig;
use crate::error::{Result, TransmitError};

/// A started CAN controller.
///
/// Receive and transmit take `&self` so one controller can be shared between
/// the forwarder reading from it and the forwarder writing to it. Controllers
/// are brought up once with [`CanInterface::start`] before any task runs.
pub trait CanInterface: Send + Sync {
    /// Install and start the controller.
    fn start(&mut self, config: &BusConfig) -> Result<()>;

    /// Non-blocking receive. Never suspends the caller.
    fn try_receive(&self) -> Option<CanFrame>;

    /// Receive, waiting at most `timeout` for a frame.
    fn receive_timeout(&self, timeout: Duration) -> Option<CanFrame>;

    /// Queue `frame` for transmission, waiting at most `timeout` for space.
    fn transmit_timeout(&self, frame: &CanFrame, timeout: Duration)
    -> core::result::Result<(), TransmitError>;
}

//! In-memory CAN controller for hosts without bus hardware.
//!
//! A [`VirtualBus`] behaves like a controller with bounded receive and
//! transmit queues. The matching [`BusWire`] is the "other side of the
//! transceiver": it injects frames that the controller will receive and drains
//! frames the controller transmitted.
//!
//! # Example
//!
//! ```
//! use can_bridge_logger::can::{virtual_bus, CanFrame, CanInterface};
//! use can_bridge_logger::config::BusConfig;
//! use std::time::Duration;
//!
//! let config = BusConfig::bridge("CAN1", 16, 17);
//! let (mut bus, wire) = virtual_bus(&config);
//! bus.start(&config).unwrap();
//!
//! wire.inject(CanFrame::standard(0x100, &[1, 2]).unwrap());
//! let frame = bus.try_receive().unwrap();
//! bus.transmit_timeout(&frame, Duration::from_millis(1)).unwrap();
//! assert_eq!(wire.take_transmitted(), Some(frame));
//! ```

use core::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

use super::{CanFrame, CanInterface};
use crate::config::BusConfig;
use crate::error::{Error, Result, TransmitError};

/// Controller side of an in-memory bus.
pub struct VirtualBus {
    label: &'static str,
    rx: Receiver<CanFrame>,
    tx: Sender<CanFrame>,
    started: bool,
    start_failure: Option<String>,
}

/// Wire side of an in-memory bus.
#[derive(Clone)]
pub struct BusWire {
    inject: Sender<CanFrame>,
    transmitted: Receiver<CanFrame>,
}

/// Create a controller/wire pair with the queue depths from `config`.
pub fn virtual_bus(config: &BusConfig) -> (VirtualBus, BusWire) {
    let (inject, rx) = bounded(config.rx_queue_len);
    let (tx, transmitted) = bounded(config.tx_queue_len);
    let bus = VirtualBus {
        label: config.label,
        rx,
        tx,
        started: false,
        start_failure: None,
    };
    (bus, BusWire {
        inject,
        transmitted,
    })
}

impl VirtualBus {
    /// Make the next [`CanInterface::start`] fail with `reason`.
    pub fn fail_start(&mut self, reason: impl Into<String>) {
        self.start_failure = Some(reason.into());
    }

    /// Whether the controller has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl CanInterface for VirtualBus {
    fn start(&mut self, config: &BusConfig) -> Result<()> {
        if let Some(reason) = self.start_failure.take() {
            return Err(Error::BusBringUp {
                interface: config.label,
                reason,
            });
        }
        log::debug!(
            target: "CAN_BRIDGE",
            "{} started at {} bit/s (tx queue {}, rx queue {})",
            self.label,
            config.bitrate,
            config.tx_queue_len,
            config.rx_queue_len
        );
        self.started = true;
        Ok(())
    }

    fn try_receive(&self) -> Option<CanFrame> {
        if !self.started {
            return None;
        }
        self.rx.try_recv().ok()
    }

    fn receive_timeout(&self, timeout: Duration) -> Option<CanFrame> {
        if !self.started {
            return None;
        }
        self.rx.recv_timeout(timeout).ok()
    }

    fn transmit_timeout(
        &self,
        frame: &CanFrame,
        timeout: Duration,
    ) -> core::result::Result<(), TransmitError> {
        if !self.started {
            return Err(TransmitError::NotStarted);
        }
        self.tx
            .send_timeout(*frame, timeout)
            .map_err(|_| TransmitError::QueueFull)
    }
}

impl BusWire {
    /// Put a frame on the wire. Returns `false` if the controller's receive
    /// queue is full and the frame was lost.
    pub fn inject(&self, frame: CanFrame) -> bool {
        self.inject.try_send(frame).is_ok()
    }

    /// Take the oldest frame the controller transmitted, if any.
    pub fn take_transmitted(&self) -> Option<CanFrame> {
        self.transmitted.try_recv().ok()
    }

    /// Wait up to `timeout` for the next transmitted frame.
    pub fn transmitted_timeout(&self, timeout: Duration) -> Option<CanFrame> {
        self.transmitted.recv_timeout(timeout).ok()
    }

    /// Drain every frame transmitted so far, oldest first.
    pub fn drain_transmitted(&self) -> Vec<CanFrame> {
        self.transmitted.try_iter().collect()
    }
}

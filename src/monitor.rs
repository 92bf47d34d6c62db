//! Monitor of the independent third bus.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use embedded_can::Frame;

use crate::can::{CanFrame, CanInterface, format_data, format_id};
use crate::clock::Clock;
use crate::config::Timing;
use crate::console::Console;
use crate::counters::Counters;
use crate::queue::{Enqueue, LogQueue};
use crate::record::{LogRecord, SourceTag};

/// Result of one monitor iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// A frame was received and counted.
    Received {
        /// Whether the frame line made it to the console
        printed: bool,
        /// Log queue result
        logged: Enqueue,
    },
    /// No frame within the receive timeout.
    Timeout,
}

/// Console line for one monitored frame, e.g.
/// `CAN2 [7e8] STD DLC:3 DATA:[02 41 0C] COUNT:12`.
struct FrameLine<'a> {
    frame: &'a CanFrame,
    count: u64,
}

impl fmt::Display for FrameLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame;
        write!(
            f,
            "CAN2 [{}] {}{} DLC:{} DATA:[{}] COUNT:{}",
            format_id(frame),
            if frame.is_extended() { "EXT" } else { "STD" },
            if frame.is_remote_frame() { " RTR" } else { "" },
            frame.dlc(),
            format_data(frame.data()),
            self.count,
        )
    }
}

/// Prints and logs every frame seen on the monitored bus.
pub struct BusMonitor<B, C> {
    bus: Arc<B>,
    queue: LogQueue,
    counters: Arc<Counters>,
    console: Arc<Console>,
    clock: C,
    rx_timeout: Duration,
    console_timeout: Duration,
    delay: Duration,
}

impl<B: CanInterface, C: Clock> BusMonitor<B, C> {
    /// Create a monitor for `bus`.
    pub fn new(
        bus: Arc<B>,
        queue: LogQueue,
        counters: Arc<Counters>,
        console: Arc<Console>,
        clock: C,
        timing: &Timing,
    ) -> Self {
        Self {
            bus,
            queue,
            counters,
            console,
            clock,
            rx_timeout: timing.monitor_rx_timeout,
            console_timeout: timing.monitor_console_timeout,
            delay: timing.monitor_delay,
        }
    }

    /// Receive (bounded) and handle at most one frame, then take the fixed
    /// per-iteration delay.
    pub fn poll_once(&mut self) -> MonitorOutcome {
        let outcome = match self.bus.receive_timeout(self.rx_timeout) {
            Some(frame) => {
                let count = self.counters.record_monitored();
                let timestamp_us = self.clock.now_us();

                let printed = match self.console.lock_for(self.console_timeout) {
                    Some(console) => {
                        let line = FrameLine {
                            frame: &frame,
                            count,
                        };
                        console.line("CAN_BRIDGE", format_args!("{line}"));
                        true
                    }
                    None => false,
                };

                let logged = self
                    .queue
                    .try_push(LogRecord::new(SourceTag::BUS_C, frame, timestamp_us));
                MonitorOutcome::Received { printed, logged }
            }
            None => MonitorOutcome::Timeout,
        };

        self.clock.sleep(self.delay);
        outcome
    }

    /// Run for the lifetime of the process.
    pub fn run(mut self) -> ! {
        log::info!(target: "CAN_BRIDGE", "CAN2 logging task started");
        loop {
            self.poll_once();
        }
    }
}

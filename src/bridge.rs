//! Bridge forwarders: the latency-critical path between bus A and bus B.
//!
//! Each direction runs its own forwarder. A forwarder polls its source bus
//! without blocking and immediately retransmits every frame on the destination
//! bus with a short bounded wait. Logging comes strictly after forwarding and
//! never blocks it: a full log queue just loses the record.
//!
//! When the source bus is idle the forwarder spins for a few polls, then
//! yields the processor for a fixed pause:
//!
//! ```text
//!            frame received
//!   ┌──────────────────────────────┐
//!   ▼                              │
//! Polling ── empty > threshold ──▶ BackingOff
//!   ▲                              │
//!   └────────── pause elapsed ─────┘
//! ```
//!
//! A frame the destination cannot accept within the timeout is dropped: it is
//! not retried, counted or logged.

use core::time::Duration;
use std::sync::Arc;

use crate::can::CanInterface;
use crate::clock::Clock;
use crate::config::Timing;
use crate::counters::Counters;
use crate::queue::{Enqueue, LogQueue};
use crate::record::{Direction, LogRecord};

/// Poll state of a forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Busy-polling the source bus.
    Polling,
    /// Yielding the processor after a run of empty polls.
    BackingOff,
}

/// Consecutive-empty counter driving the Polling/BackingOff transitions.
#[derive(Debug, Clone)]
pub struct Backoff {
    state: PollState,
    consecutive_empty: u32,
    threshold: u32,
    pause: Duration,
}

impl Backoff {
    /// Back off for `pause` once more than `threshold` consecutive polls were
    /// empty.
    pub fn new(threshold: u32, pause: Duration) -> Self {
        Self {
            state: PollState::Polling,
            consecutive_empty: 0,
            threshold,
            pause,
        }
    }

    /// Current state.
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Empty polls since the last frame or pause.
    pub fn consecutive_empty(&self) -> u32 {
        self.consecutive_empty
    }

    /// A frame arrived.
    pub fn on_frame(&mut self) {
        self.consecutive_empty = 0;
        self.state = PollState::Polling;
    }

    /// A poll came back empty. Returns the pause to take when the threshold
    /// is exceeded; the forwarder is then `BackingOff` until [`Self::resume`].
    pub fn on_empty(&mut self) -> Option<Duration> {
        self.consecutive_empty += 1;
        if self.consecutive_empty <= self.threshold {
            return None;
        }
        self.consecutive_empty = 0;
        self.state = PollState::BackingOff;
        Some(self.pause)
    }

    /// The pause elapsed.
    pub fn resume(&mut self) {
        self.state = PollState::Polling;
    }
}

/// Result of one forwarder poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The frame went out on the destination bus; carries the log enqueue
    /// result.
    Forwarded(Enqueue),
    /// The destination did not accept the frame in time; it was dropped.
    TransmitFailed,
    /// Nothing to receive.
    Empty,
    /// Nothing to receive, and the forwarder yielded for its pause.
    BackedOff,
}

/// One direction of the bridge.
pub struct BridgeForwarder<S, D, C> {
    direction: Direction,
    source: Arc<S>,
    destination: Arc<D>,
    queue: LogQueue,
    counters: Arc<Counters>,
    clock: C,
    backoff: Backoff,
    tx_timeout: Duration,
}

impl<S, D, C> BridgeForwarder<S, D, C>
where
    S: CanInterface,
    D: CanInterface,
    C: Clock,
{
    /// Create a forwarder from `source` to `destination`.
    pub fn new(
        direction: Direction,
        source: Arc<S>,
        destination: Arc<D>,
        queue: LogQueue,
        counters: Arc<Counters>,
        clock: C,
        timing: &Timing,
    ) -> Self {
        Self {
            direction,
            source,
            destination,
            queue,
            counters,
            clock,
            backoff: Backoff::new(timing.backoff_threshold, timing.backoff_pause),
            tx_timeout: timing.forward_tx_timeout,
        }
    }

    /// Forwarding direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current poll state.
    pub fn state(&self) -> PollState {
        self.backoff.state()
    }

    /// Poll the source bus once.
    pub fn poll_once(&mut self) -> PollOutcome {
        let Some(frame) = self.source.try_receive() else {
            return match self.backoff.on_empty() {
                Some(pause) => {
                    self.clock.sleep(pause);
                    self.backoff.resume();
                    PollOutcome::BackedOff
                }
                None => PollOutcome::Empty,
            };
        };

        let timestamp_us = self.clock.now_us();
        self.backoff.on_frame();

        if self
            .destination
            .transmit_timeout(&frame, self.tx_timeout)
            .is_err()
        {
            return PollOutcome::TransmitFailed;
        }

        self.counters.record_forward(self.direction);
        let record = LogRecord::new(self.direction.tag(), frame, timestamp_us);
        PollOutcome::Forwarded(self.queue.try_push(record))
    }

    /// Run for the lifetime of the process.
    pub fn run(mut self) -> ! {
        log::info!(
            target: "CAN_BRIDGE",
            "{} high-speed bridge task started",
            self.direction.name()
        );
        loop {
            self.poll_once();
        }
    }
}

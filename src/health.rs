//! Heartbeat indicator and periodic health report.
//!
//! The indicator toggles on every tick regardless of system health; it only
//! shows that the scheduler still reaches the lowest-priority task. Every
//! `report_every` ticks a counter snapshot is printed if the console can be
//! acquired in time. A missed report is not retried.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::clock::Clock;
use crate::config::Timing;
use crate::console::Console;
use crate::counters::{Counters, HealthStatus};

/// Binary status output (e.g. an LED).
pub trait StatusIndicator: Send {
    /// Drive the output.
    fn set(&mut self, on: bool);
}

/// Indicator state shared through an atomic, readable from any thread.
#[derive(Debug, Clone, Default)]
pub struct SharedIndicator {
    on: Arc<AtomicBool>,
}

impl SharedIndicator {
    /// An indicator that starts off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output level.
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }
}

impl StatusIndicator for SharedIndicator {
    fn set(&mut self, on: bool) {
        self.on.store(on, Ordering::Relaxed);
    }
}

/// Result of one heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Only the indicator toggled.
    Heartbeat,
    /// A report was due and printed.
    Reported(HealthStatus),
    /// A report was due but the console was busy.
    ReportSkipped,
}

/// Lowest-priority task: heartbeat plus periodic snapshot.
pub struct HealthReporter<I, C> {
    indicator: I,
    counters: Arc<Counters>,
    console: Arc<Console>,
    clock: C,
    heartbeat_on: bool,
    ticks: u32,
    period: Duration,
    report_every: u32,
    console_timeout: Duration,
}

impl<I: StatusIndicator, C: Clock> HealthReporter<I, C> {
    /// Create a reporter driving `indicator`.
    pub fn new(
        indicator: I,
        counters: Arc<Counters>,
        console: Arc<Console>,
        clock: C,
        timing: &Timing,
    ) -> Self {
        Self {
            indicator,
            counters,
            console,
            clock,
            heartbeat_on: false,
            ticks: 0,
            period: timing.heartbeat_period,
            report_every: timing.report_every.max(1),
            console_timeout: timing.report_console_timeout,
        }
    }

    /// Ticks since start.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Toggle the indicator and, every `report_every` ticks, try to report.
    pub fn tick(&mut self) -> TickOutcome {
        self.heartbeat_on = !self.heartbeat_on;
        self.indicator.set(self.heartbeat_on);

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % self.report_every != 0 {
            return TickOutcome::Heartbeat;
        }

        let Some(console) = self.console.lock_for(self.console_timeout) else {
            return TickOutcome::ReportSkipped;
        };
        let status = self.counters.snapshot(self.heartbeat_on);
        console.line("LED_STATUS", format_args!("Status: {status}"));
        TickOutcome::Reported(status)
    }

    /// Run for the lifetime of the process.
    pub fn run(mut self) -> ! {
        log::info!(target: "LED_STATUS", "LED status task started");
        loop {
            self.tick();
            self.clock.sleep(self.period);
        }
    }
}

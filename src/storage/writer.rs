//! Storage writer task: the single consumer of the log queue.

use std::io::Write;
use std::sync::Arc;

use core::time::Duration;

use parking_lot::Mutex;

use super::LogTable;
use crate::config::Timing;
use crate::queue::LogConsumer;
use crate::record::LogRecord;

/// A log table behind the storage lock.
pub type SharedTable<W> = Arc<Mutex<LogTable<W>>>;

/// What happened to one dequeued record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// One row was appended; `flushed` is set when this row triggered the
    /// periodic flush.
    Written { flushed: bool },
    /// Storage never came up; the record was dropped.
    NotReady,
    /// The storage lock was not acquired in time; the record was dropped.
    LockTimeout,
    /// The sink rejected the row; the record was dropped.
    Failed,
}

/// Result of one writer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A record was dequeued and handled.
    Record(WriteOutcome),
    /// The queue stayed empty for a whole timeout; `flushed` tells whether the
    /// best-effort idle flush ran.
    Idle { flushed: bool },
}

/// Drains the log queue into the log table.
pub struct StorageWriter<W: Write> {
    table: Option<SharedTable<W>>,
    consumer: LogConsumer,
    rows_since_flush: u32,
    flush_every: u32,
    queue_timeout: Duration,
    lock_timeout: Duration,
    idle_flush_timeout: Duration,
}

impl<W: Write> StorageWriter<W> {
    /// Create a writer. `table` is `None` when storage failed at startup, in
    /// which case every record is dropped for the rest of the run.
    pub fn new(table: Option<SharedTable<W>>, consumer: LogConsumer, timing: &Timing) -> Self {
        Self {
            table,
            consumer,
            rows_since_flush: 0,
            flush_every: timing.flush_every.max(1),
            queue_timeout: timing.queue_timeout,
            lock_timeout: timing.storage_lock_timeout,
            idle_flush_timeout: timing.idle_flush_lock_timeout,
        }
    }

    /// Whether a table is open.
    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    /// Persist one record.
    pub fn write(&mut self, record: &LogRecord) -> WriteOutcome {
        let Some(table) = &self.table else {
            return WriteOutcome::NotReady;
        };
        let Some(mut table) = table.try_lock_for(self.lock_timeout) else {
            return WriteOutcome::LockTimeout;
        };

        if let Err(e) = table.append(record) {
            log::debug!(target: "SD_CARD", "dropping record: {e}");
            return WriteOutcome::Failed;
        }

        self.rows_since_flush += 1;
        if self.rows_since_flush < self.flush_every {
            return WriteOutcome::Written { flushed: false };
        }
        self.rows_since_flush = 0;
        let flushed = match table.flush() {
            Ok(()) => true,
            Err(e) => {
                log::debug!(target: "SD_CARD", "periodic flush failed: {e}");
                false
            }
        };
        WriteOutcome::Written { flushed }
    }

    /// Best-effort flush while the queue is idle.
    pub fn flush_idle(&mut self) -> bool {
        let Some(table) = &self.table else {
            return false;
        };
        match table.try_lock_for(self.idle_flush_timeout) {
            Some(mut table) => table.flush().is_ok(),
            None => false,
        }
    }

    /// Wait for the next record (bounded) and handle it, or flush on timeout.
    pub fn step(&mut self) -> StepOutcome {
        match self.consumer.pop_timeout(self.queue_timeout) {
            Some(record) => StepOutcome::Record(self.write(&record)),
            None => StepOutcome::Idle {
                flushed: self.flush_idle(),
            },
        }
    }

    /// Run for the lifetime of the process.
    pub fn run(mut self) -> ! {
        log::info!(target: "SD_CARD", "SD logging task started");
        loop {
            self.step();
        }
    }
}

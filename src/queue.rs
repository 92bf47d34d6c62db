//! Bounded log queue between the bus tasks and the storage writer.
//!
//! Producers never block: when the queue is full the new record is dropped and
//! the caller gets [`Enqueue::Dropped`], which it is free to ignore. The single
//! consumer waits with a bounded timeout so it wakes periodically even when the
//! buses are idle.

use core::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::record::LogRecord;

/// Result of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// The record was queued.
    Accepted,
    /// The queue was full; the record was discarded.
    Dropped,
}

impl Enqueue {
    /// Whether the record was queued.
    pub fn is_accepted(self) -> bool {
        self == Enqueue::Accepted
    }
}

/// Producer handle; clone one per producing task.
#[derive(Clone)]
pub struct LogQueue {
    tx: Sender<LogRecord>,
}

/// The single consumer of the log queue.
pub struct LogConsumer {
    rx: Receiver<LogRecord>,
    // Keeps the channel connected even if every producer is gone, so
    // `pop_timeout` always waits instead of spinning.
    _keepalive: Sender<LogRecord>,
}

/// Create a queue holding at most `capacity` records.
pub fn log_queue(capacity: usize) -> (LogQueue, LogConsumer) {
    let (tx, rx) = bounded(capacity);
    let consumer = LogConsumer {
        rx,
        _keepalive: tx.clone(),
    };
    (LogQueue { tx }, consumer)
}

impl LogQueue {
    /// Enqueue without blocking.
    pub fn try_push(&self, record: LogRecord) -> Enqueue {
        match self.tx.try_send(record) {
            Ok(()) => Enqueue::Accepted,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => Enqueue::Dropped,
        }
    }

    /// Records currently waiting.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether no record is waiting.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Fixed capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }
}

impl LogConsumer {
    /// Dequeue the oldest record, waiting at most `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<LogRecord> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Records currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no record is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

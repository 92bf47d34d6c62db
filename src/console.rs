//! Console guard serialising human-readable output between tasks.

use core::fmt;
use core::time::Duration;

use parking_lot::{Mutex, MutexGuard};

/// Exclusive access to the diagnostic console.
///
/// Tasks that print take the guard with a bounded timeout and skip their
/// output when it is not available.
#[derive(Debug, Default)]
pub struct Console {
    lock: Mutex<()>,
}

/// Scoped console access; released when dropped.
pub struct ConsoleGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl Console {
    /// Create an unlocked console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the console, waiting at most `timeout`.
    pub fn lock_for(&self, timeout: Duration) -> Option<ConsoleGuard<'_>> {
        self.lock
            .try_lock_for(timeout)
            .map(|guard| ConsoleGuard { _guard: guard })
    }
}

impl ConsoleGuard<'_> {
    /// Emit one line tagged with `target`.
    pub fn line(&self, target: &str, args: fmt::Arguments<'_>) {
        log::info!(target: target, "{args}");
    }
}

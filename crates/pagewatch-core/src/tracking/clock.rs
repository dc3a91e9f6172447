//! Injectable sleeping.

use crate::tracking::cancel::CancellationSignal;
use std::time::Duration;

/// Why a [`Clock::sleep`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

/// Source of poll-interval waits.
///
/// Implementations must return [`Wake::Cancelled`] promptly once `cancel`
/// is raised, including when it is already raised on entry.
pub trait Clock: Send + Sync {
    fn sleep(&self, interval: Duration, cancel: &CancellationSignal) -> Wake;
}

/// Wall-clock sleeping on the cancellation signal's condition variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, interval: Duration, cancel: &CancellationSignal) -> Wake {
        if cancel.wait_timeout(interval) {
            Wake::Cancelled
        } else {
            Wake::Elapsed
        }
    }
}

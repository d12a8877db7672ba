//! Cancellable delayed tasks.
//!
//! The calibration hold is the only timed activity in the system. A scheduler
//! hands out a [`TimerToken`] per task; the token comes back to the consumer
//! when the delay elapses. Cancelling is idempotent, and a cancelled token is
//! never reported as fired.

mod manual;
mod tokio_scheduler;

pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;

use std::fmt;
use std::time::Duration;

/// Identifies one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Schedules delayed tasks on behalf of the calibration controller.
pub trait DelayScheduler {
    /// Schedule a task that fires after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerToken;

    /// Cancel a task. Cancelling an unknown or already fired token is a no-op.
    fn cancel(&mut self, token: TimerToken);
}

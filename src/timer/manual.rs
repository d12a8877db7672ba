//! Virtual-clock scheduler for deterministic driving of the controller.

use std::collections::BTreeMap;
use std::time::Duration;

use super::{DelayScheduler, TimerToken};

/// Scheduler whose clock only moves when [`ManualScheduler::advance`] is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    /// Pending tasks keyed by token, valued by deadline.
    pending: BTreeMap<TimerToken, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of tasks still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.contains_key(&token)
    }

    /// Move the clock forward and return the tasks that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now = self.now.saturating_add(by);
        let now = self.now;

        let mut due: Vec<(Duration, TimerToken)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(token, deadline)| (*deadline, *token))
            .collect();
        due.sort();

        for (_, token) in &due {
            self.pending.remove(token);
        }

        due.into_iter().map(|(_, token)| token).collect()
    }
}

impl DelayScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken::new(self.next_id);
        self.pending.insert(token, self.now.saturating_add(delay));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.remove(&token);
    }
}

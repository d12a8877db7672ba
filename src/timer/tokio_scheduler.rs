//! Scheduler backed by tokio timers.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{DelayScheduler, TimerToken};

/// Spawns one sleeping task per scheduled token and delivers fired tokens on
/// a channel, so timer firings are serialized with every other event.
///
/// A task can finish sleeping and send its token just before being
/// cancelled. The receiver must therefore pass each received token through
/// [`TokioScheduler::acknowledge`], which rejects anything cancelled.
#[derive(Debug)]
pub struct TokioScheduler {
    fired_tx: mpsc::UnboundedSender<TimerToken>,
    next_id: u64,
    tasks: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its tokens are delivered on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            fired_tx,
            next_id: 0,
            tasks: HashMap::new(),
        };
        (scheduler, fired_rx)
    }

    /// Accept a token received from the channel.
    ///
    /// Returns `false` when the token was cancelled after its task sent it.
    pub fn acknowledge(&mut self, token: TimerToken) -> bool {
        self.tasks.remove(&token).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}

impl DelayScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken::new(self.next_id);
        let fired_tx = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(token);
        });

        self.tasks.insert(token, task);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(task) = self.tasks.remove(&token) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

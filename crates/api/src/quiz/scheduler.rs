//! Tokio-backed [`Scheduler`] for live sessions.

use std::collections::HashMap;
use std::time::Duration;

use quizline_core::scheduler::{Scheduler, TimerSlot, Wake};
use quizline_core::types::Timestamp;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Receiving half of the wake channel, drained by the session task.
pub type WakeReceiver = mpsc::UnboundedReceiver<Wake>;

/// One sleeping task per armed slot. Re-arming or cancelling a slot aborts
/// its task, and dropping the scheduler aborts all of them.
pub struct TokioScheduler {
    origin: Timestamp,
    started: Instant,
    wakes: mpsc::UnboundedSender<Wake>,
    pending: HashMap<TimerSlot, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new() -> (Self, WakeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            origin: chrono::Utc::now(),
            started: Instant::now(),
            wakes: tx,
            pending: HashMap::new(),
        };
        (scheduler, rx)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    /// Wall clock derived from the tokio clock, so paused-time tests see
    /// consistent durations.
    fn now(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + elapsed
    }

    fn schedule(&mut self, delay: Duration, wake: Wake) {
        let tx = self.wakes.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(wake);
        });
        if let Some(previous) = self.pending.insert(wake.slot, handle) {
            previous.abort();
        }
    }

    fn cancel(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.pending.remove(&slot) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

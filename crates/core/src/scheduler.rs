//! Scheduler abstraction for the session controller.
//!
//! The controller never sleeps. It asks a [`Scheduler`] to deliver a
//! [`Wake`] after a delay, one pending wake per [`TimerSlot`]. Scheduling
//! into an occupied slot replaces the pending wake, and cancelling a slot
//! drops it. Every wake also carries the slot generation it was armed
//! with, so a wake that was already in flight when its slot was re-armed or
//! cancelled is recognised as stale and ignored.
//!
//! [`ManualScheduler`] is a virtual-time implementation used to drive the
//! controller deterministically.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::types::Timestamp;

/// One logical pending-timer handle per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Per-question countdown tick.
    QuestionClock,
    /// Answer feedback and advancing to the next question.
    Feedback,
    /// Typing / streaming reveal of the active message.
    Choreography,
    /// Canned reply to free-text input.
    Reply,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 4] = [
        TimerSlot::QuestionClock,
        TimerSlot::Feedback,
        TimerSlot::Choreography,
        TimerSlot::Reply,
    ];
}

/// What the controller should do when a wake fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeKind {
    ClockTick,
    ShowFeedback,
    Advance,
    TypingElapsed,
    RevealTick,
    Reply,
}

/// A scheduled callback into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    pub slot: TimerSlot,
    pub generation: u64,
    pub kind: WakeKind,
}

/// Time source and timer service for a session.
pub trait Scheduler {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;

    /// Deliver `wake` after `delay`, replacing any pending wake in the same slot.
    fn schedule(&mut self, delay: Duration, wake: Wake);

    /// Drop the pending wake of `slot`, if any.
    fn cancel(&mut self, slot: TimerSlot);
}

// ---------------------------------------------------------------------------
// Slot generations
// ---------------------------------------------------------------------------

/// Generation counters used to discard stale wakes.
#[derive(Debug, Default)]
pub(crate) struct SlotGenerations {
    current: HashMap<TimerSlot, u64>,
}

impl SlotGenerations {
    /// Bump and return the generation of `slot`.
    pub fn arm(&mut self, slot: TimerSlot) -> u64 {
        let entry = self.current.entry(slot).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Invalidate any outstanding wake of `slot`.
    pub fn disarm(&mut self, slot: TimerSlot) {
        self.arm(slot);
    }

    pub fn is_current(&self, wake: &Wake) -> bool {
        self.current.get(&wake.slot) == Some(&wake.generation)
    }
}

// ---------------------------------------------------------------------------
// Manual scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Duration,
    seq: u64,
    wake: Wake,
}

/// Virtual-time scheduler.
///
/// Time only moves when [`ManualScheduler::pop_due`] is called. Wakes due at
/// the same instant are delivered in scheduling order.
#[derive(Debug)]
pub struct ManualScheduler {
    origin: Timestamp,
    elapsed: Duration,
    pending: Vec<Pending>,
    seq: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).single().unwrap_or_default())
    }

    pub fn starting_at(origin: Timestamp) -> Self {
        Self {
            origin,
            elapsed: Duration::ZERO,
            pending: Vec::new(),
            seq: 0,
        }
    }

    /// Virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether a wake is pending in `slot`.
    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.pending.iter().any(|p| p.wake.slot == slot)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the earliest wake due at or before `deadline`,
    /// advancing virtual time to its due instant.
    ///
    /// Returns `None` (and advances time to `deadline`) when nothing is due.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Wake> {
        let next = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= deadline)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i);

        match next {
            Some(i) => {
                let pending = self.pending.remove(i);
                self.elapsed = self.elapsed.max(pending.due);
                Some(pending.wake)
            }
            None => {
                self.elapsed = self.elapsed.max(deadline);
                None
            }
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Timestamp {
        self.origin + chrono::Duration::from_std(self.elapsed).unwrap_or(chrono::Duration::zero())
    }

    fn schedule(&mut self, delay: Duration, wake: Wake) {
        self.cancel(wake.slot);
        self.seq += 1;
        self.pending.push(Pending {
            due: self.elapsed + delay,
            seq: self.seq,
            wake,
        });
    }

    fn cancel(&mut self, slot: TimerSlot) {
        self.pending.retain(|p| p.wake.slot != slot);
    }
}

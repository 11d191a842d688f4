//! Per-question countdown.
//!
//! The clock only counts; the controller owns the scheduling of ticks.
//! A tick on a stopped clock is ignored, which is what makes a late tick
//! after an answer harmless.

use std::time::Duration;

/// Default interval between two countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock is not running; nothing changed.
    Ignored,
    /// Still counting down.
    Running { remaining_secs: u32 },
    /// Reached zero on this tick. The clock is now stopped.
    Expired,
}

#[derive(Debug, Clone)]
pub struct QuestionClock {
    enabled: bool,
    limit_secs: u32,
    remaining_secs: u32,
    running: bool,
}

impl QuestionClock {
    pub fn new(enabled: bool, limit_secs: u32) -> Self {
        Self {
            enabled,
            limit_secs,
            remaining_secs: limit_secs,
            running: false,
        }
    }

    /// Reset to the limit and start counting.
    ///
    /// Returns whether the clock is running, which is `false` when the timer
    /// is administratively disabled.
    pub fn arm(&mut self) -> bool {
        self.remaining_secs = self.limit_secs;
        self.running = self.enabled && self.limit_secs > 0;
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn limit_secs(&self) -> u32 {
        self.limit_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_exactly_limit_ticks() {
        let mut clock = QuestionClock::new(true, 3);
        assert!(clock.arm());
        assert_eq!(clock.tick(), TickOutcome::Running { remaining_secs: 2 });
        assert_eq!(clock.tick(), TickOutcome::Running { remaining_secs: 1 });
        assert_eq!(clock.tick(), TickOutcome::Expired);
        assert_eq!(clock.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn disabled_clock_never_runs() {
        let mut clock = QuestionClock::new(false, 30);
        assert!(!clock.arm());
        assert!(!clock.is_running());
        assert_eq!(clock.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn stop_ignores_further_ticks() {
        let mut clock = QuestionClock::new(true, 30);
        clock.arm();
        clock.tick();
        clock.stop();
        assert_eq!(clock.tick(), TickOutcome::Ignored);
        assert_eq!(clock.remaining_secs(), 29);
    }

    #[test]
    fn arm_resets_to_limit() {
        let mut clock = QuestionClock::new(true, 5);
        clock.arm();
        clock.tick();
        clock.tick();
        clock.arm();
        assert_eq!(clock.remaining_secs(), 5);
    }
}

//! Quiz session state machine.
//!
//! A session moves `idle → playing → finished → idle`. While playing, each
//! question walks through three steps:
//!
//! | Step        | Accepts answers | Pending wake                      |
//! |-------------|-----------------|-----------------------------------|
//! | `Answering` | yes             | clock tick (if the timer is on)   |
//! | `Reviewing` | no              | show feedback after the delay     |
//! | `Advancing` | no              | next question / finalize          |
//!
//! Only `Answering` accepts a submission, so a click racing a timeout is
//! resolved by whichever reaches the controller first; the other is
//! ignored.

mod controller;
mod script;

use std::time::Duration;

use serde::Serialize;

pub use controller::QuizController;

use crate::chat::ChatMessage;
use crate::choreography::ChoreographyPacing;
use crate::clock::TICK_INTERVAL;
use crate::level::Level;
use crate::question::Difficulty;
use crate::results::NewQuizResult;
use crate::types::Timestamp;

/// Session-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Playing,
    Finished,
}

/// Step of the current question while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuestionStep {
    Answering,
    Reviewing,
    Advancing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Playing(QuestionStep),
    Finished,
}

impl Phase {
    pub fn state(self) -> SessionState {
        match self {
            Phase::Idle => SessionState::Idle,
            Phase::Playing(_) => SessionState::Playing,
            Phase::Finished => SessionState::Finished,
        }
    }
}

/// Outcome of one question in the answer log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSlot {
    Unanswered,
    Correct,
    Incorrect,
}

/// Whether an action changed the session.
///
/// Actions invoked outside their valid state are ignored rather than
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOutcome {
    Applied,
    Ignored,
}

/// Delays driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// From a submission to its feedback message.
    pub feedback_delay: Duration,
    /// From the feedback message to the next question (or the result).
    pub advance_delay: Duration,
    /// Typing indicator shown before a message starts revealing.
    pub typing_delay: Duration,
    /// Per-character reveal interval.
    pub reveal_interval: Duration,
    /// Countdown tick.
    pub tick_interval: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_millis(500),
            advance_delay: Duration::from_millis(800),
            typing_delay: Duration::from_millis(600),
            reveal_interval: Duration::from_millis(15),
            tick_interval: TICK_INTERVAL,
        }
    }
}

impl Pacing {
    pub(crate) fn choreography(&self) -> ChoreographyPacing {
        ChoreographyPacing {
            typing_delay: self.typing_delay,
            reveal_interval: self.reveal_interval,
        }
    }
}

/// Side effects the owner of the controller must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    StateChanged(SessionState),
    QuestionPresented {
        index: usize,
    },
    AnswerRecorded {
        index: usize,
        correct: bool,
        timed_out: bool,
    },
    /// The session finished; the result should be persisted once.
    Completed(NewQuizResult),
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    pub messages: Vec<ChatMessage>,
    pub current_question: Option<usize>,
    pub total_questions: usize,
    pub score: u32,
    pub answers: Vec<AnswerSlot>,
    pub timer_enabled: bool,
    pub time_remaining: Option<u32>,
    pub show_options: bool,
    pub show_difficulty_badge: bool,
    pub current_difficulty: Option<Difficulty>,
    pub email: Option<String>,
    pub started_at: Option<Timestamp>,
    pub level: Option<Level>,
}

//! Typing / streaming choreography of assistant messages.
//!
//! A newly appended assistant message first shows a typing indicator, then
//! reveals its content one character per interval, then settles. Only the
//! most recent message can be active. Appending anything else settles the
//! active message at once, so pacing never holds back the session.

use std::time::Duration;

use crate::chat::Transcript;
use crate::types::Timestamp;

/// Next step the choreographer wants scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    TypingElapsed(Duration),
    RevealTick(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct ChoreographyPacing {
    pub typing_delay: Duration,
    pub reveal_interval: Duration,
}

#[derive(Debug, Clone)]
struct Active {
    message_id: String,
    total_chars: usize,
}

#[derive(Debug, Clone)]
pub struct Choreographer {
    pacing: ChoreographyPacing,
    active: Option<Active>,
}

impl Choreographer {
    pub fn new(pacing: ChoreographyPacing) -> Self {
        Self {
            pacing,
            active: None,
        }
    }

    pub fn active_message_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.message_id.as_str())
    }

    /// Put the last message of `transcript` into the typing state.
    pub fn begin(&mut self, transcript: &mut Transcript) -> Option<Cue> {
        let message = transcript.messages().last()?;
        let id = message.id.clone();
        let total_chars = message.char_count();

        let message = transcript.last_mut_with_id(&id)?;
        message.is_typing = true;
        message.is_streaming = false;
        message.revealed_chars = 0;
        message.settled_at = None;

        self.active = Some(Active {
            message_id: id,
            total_chars,
        });
        Some(Cue::TypingElapsed(self.pacing.typing_delay))
    }

    /// Typing indicator elapsed: switch to streaming.
    pub fn typing_elapsed(&mut self, transcript: &mut Transcript, now: Timestamp) -> Option<Cue> {
        let active = self.active.as_ref()?;
        if active.total_chars == 0 {
            self.settle(transcript, now);
            return None;
        }
        let message = transcript.last_mut_with_id(&active.message_id)?;
        message.is_typing = false;
        message.is_streaming = true;
        message.revealed_chars = 0;
        Some(Cue::RevealTick(self.pacing.reveal_interval))
    }

    /// Reveal one more character, settling when the content is complete.
    pub fn reveal_tick(&mut self, transcript: &mut Transcript, now: Timestamp) -> Option<Cue> {
        let active = self.active.as_ref()?;
        let total = active.total_chars;
        let message = transcript.last_mut_with_id(&active.message_id)?;
        message.revealed_chars = (message.revealed_chars + 1).min(total);
        if message.revealed_chars >= total {
            self.settle(transcript, now);
            None
        } else {
            Some(Cue::RevealTick(self.pacing.reveal_interval))
        }
    }

    /// Render the active message completely and release it.
    ///
    /// Returns the id of the settled message, if one was active.
    pub fn settle(&mut self, transcript: &mut Transcript, now: Timestamp) -> Option<String> {
        let active = self.active.take()?;
        if let Some(message) = transcript.last_mut_with_id(&active.message_id) {
            message.is_typing = false;
            message.is_streaming = false;
            message.revealed_chars = active.total_chars;
            message.settled_at = Some(now);
        }
        Some(active.message_id)
    }

    /// Forget the active message without touching the transcript.
    pub fn clear(&mut self) {
        self.active = None;
    }
}

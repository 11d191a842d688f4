//! Chat transcript model.
//!
//! The transcript is append-only. The only in-place mutation allowed is on
//! the transient render flags (`is_typing`, `is_streaming`, `revealed_chars`,
//! `settled_at`) of the most recent message, driven by
//! [`crate::choreography::Choreographer`].

use serde::Serialize;

use crate::question::Difficulty;
use crate::types::Timestamp;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// What a transcript entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Question,
    Welcome,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub kind: MessageKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub is_typing: bool,
    pub is_streaming: bool,
    /// Number of characters of `content` currently revealed.
    pub revealed_chars: usize,
    pub created_at: Timestamp,
    /// Set once the message is fully rendered.
    pub settled_at: Option<Timestamp>,
}

impl ChatMessage {
    /// A fully rendered message (no choreography).
    pub fn settled(
        id: String,
        role: Role,
        kind: MessageKind,
        content: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let content = content.into();
        let revealed_chars = content.chars().count();
        Self {
            id,
            role,
            kind,
            content,
            options: None,
            question_index: None,
            is_correct: None,
            difficulty: None,
            is_typing: false,
            is_streaming: false,
            revealed_chars,
            created_at: now,
            settled_at: Some(now),
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_question_index(mut self, index: usize) -> Self {
        self.question_index = Some(index);
        self
    }

    pub fn with_correctness(mut self, is_correct: bool) -> Self {
        self.is_correct = Some(is_correct);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// The part of `content` revealed so far.
    pub fn visible_content(&self) -> &str {
        match self.content.char_indices().nth(self.revealed_chars) {
            Some((byte_idx, _)) => &self.content[..byte_idx],
            None => &self.content,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }
}

/// Append-only list of chat messages with id generation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique message id with the given prefix (`q`, `a`, `f`...).
    pub fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_seq);
        self.next_seq += 1;
        id
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Mutable access to the most recent message, only if it has `id`.
    pub(crate) fn last_mut_with_id(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.messages.last_mut().filter(|m| m.id == id)
    }

    /// Drop every message and start over with `first`.
    pub(crate) fn reset_with(&mut self, first: ChatMessage) {
        self.messages.clear();
        self.messages.push(first);
    }
}

//! Quizline domain core.
//!
//! Pure, I/O-free building blocks of the quiz: question and tier models,
//! admin-controlled settings, the question pool selector, the chat
//! transcript with its typing/streaming choreography, the per-question
//! clock, and the session controller that ties them together.
//!
//! Time is injected through [`scheduler::Scheduler`] and randomness through
//! [`rand::RngCore`], so every state transition can be driven
//! deterministically from tests.

pub mod catalog;
pub mod chat;
pub mod choreography;
pub mod clock;
pub mod error;
pub mod identity;
pub mod level;
pub mod participants;
pub mod question;
pub mod results;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod settings;
pub mod types;

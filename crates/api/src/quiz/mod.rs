//! Hosting of quiz sessions.
//!
//! Each session is a [`quizline_core::session::QuizController`] owned by a
//! dedicated task ([`actor`]). Handlers talk to it through a cloneable
//! [`actor::SessionHandle`]; timers requested by the controller are tokio
//! sleeps that feed wakes back into the same task ([`scheduler`]).

pub mod actor;
pub mod registry;
pub mod scheduler;
pub mod store;

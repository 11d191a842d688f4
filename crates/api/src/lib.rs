//! HTTP host for the chat quiz.
//!
//! Each browser conversation is a session task under [`quiz`]; the
//! dashboard handlers read and edit what those sessions persist.
//! The binary and `tests/` share everything through this library.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod quiz;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

//! Admin authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and verification of the operator password.
//! - [`jwt`] -- HS256 admin token generation and validation.
//! - [`rate_limit`] -- Per-client fixed-window limiter for login attempts.

pub mod jwt;
pub mod password;
pub mod rate_limit;

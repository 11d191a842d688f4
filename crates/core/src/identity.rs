//! Participant identifier (email) validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

/// Trim, lowercase and validate a participant email.
///
/// Returns the normalized address bound to the session.
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(&email) {
        return Err(CoreError::Validation("Please enter a valid email".into()));
    }
    Ok(email)
}

//! Fixed-window rate limiting of admin login attempts, keyed by client IP.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::time::Instant;

/// Attempts allowed per window.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Window length.
pub const LOGIN_WINDOW: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

/// Counts every attempt (successful or not) per client.
#[derive(Debug)]
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt from `client`.
    ///
    /// Returns `Err(retry_after_secs)` when the client has used up its
    /// window.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match windows.get_mut(client) {
            Some(w) if now < w.resets_at => {
                if w.count >= self.max_attempts {
                    let remaining = w.resets_at - now;
                    return Err(remaining.as_secs_f64().ceil() as u64);
                }
                w.count += 1;
                Ok(())
            }
            _ => {
                windows.retain(|_, w| now < w.resets_at);
                windows.insert(
                    client.to_string(),
                    Window {
                        count: 1,
                        resets_at: now + self.window,
                    },
                );
                Ok(())
            }
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .map(|windows| windows.len())
            .unwrap_or(0)
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(MAX_LOGIN_ATTEMPTS, LOGIN_WINDOW)
    }
}

/// Key for login throttling.
///
/// The first hop of `x-forwarded-for` is used only when `trust_forwarded_for`
/// is set, since clients can write that header themselves. Otherwise the
/// socket peer is used, or `"unknown"` when the connection carries none.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(peer)) => peer.to_string(),
        (None, None) => "unknown".to_string(),
    }
}

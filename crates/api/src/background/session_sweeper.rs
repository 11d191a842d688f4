//! Periodic eviction of abandoned quiz sessions.
//!
//! A browser that closes mid-quiz never deletes its session, so sessions
//! with no request for the configured idle timeout are stopped here.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::quiz::registry::SessionRegistry;

/// Run the sweep loop until `cancel` is triggered, then stop every
/// remaining session.
pub async fn run(
    sessions: Arc<SessionRegistry>,
    idle_timeout: Duration,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        idle_timeout_secs = idle_timeout.as_secs(),
        interval_secs = every.as_secs(),
        "Session sweeper started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                sessions.shutdown_all().await;
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = sessions.evict_idle(idle_timeout).await;
                if evicted > 0 {
                    tracing::info!(evicted, "Session sweeper: evicted idle sessions");
                } else {
                    tracing::debug!("Session sweeper: nothing to evict");
                }
            }
        }
    }
}

use std::sync::Arc;

use crate::auth::rate_limit::LoginRateLimiter;
use crate::config::ServerConfig;
use crate::quiz::registry::SessionRegistry;
use crate::quiz::store::{PgCatalogSource, PgResultsWriter};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: quizline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live quiz sessions keyed by session id.
    pub sessions: Arc<SessionRegistry>,
    /// Per-client throttle on admin login attempts.
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// State backed by Postgres for both quiz content and results.
    pub fn new(pool: quizline_db::DbPool, config: ServerConfig) -> Self {
        let sessions = SessionRegistry::new(
            Arc::new(PgCatalogSource::new(pool.clone())),
            Arc::new(PgResultsWriter::new(pool.clone())),
            config.quiz.pacing,
        );
        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            login_limiter: Arc::new(LoginRateLimiter::default()),
        }
    }
}

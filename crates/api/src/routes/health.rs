//! Liveness probe, mounted outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Quiz sessions currently hosted by this process.
    pub active_sessions: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = quizline_db::health_check(&state.pool).await.is_ok();
    let active_sessions = state.sessions.len().await;

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        active_sessions,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

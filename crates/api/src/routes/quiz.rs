//! Route definitions for the `/quiz` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quiz;
use crate::state::AppState;

/// Routes mounted at `/quiz`.
///
/// ```text
/// POST   /sessions                -> create_session
/// GET    /sessions/{id}           -> get_session
/// DELETE /sessions/{id}           -> delete_session
/// POST   /sessions/{id}/start     -> start_session
/// POST   /sessions/{id}/answer    -> submit_answer
/// POST   /sessions/{id}/messages  -> send_message
/// POST   /sessions/{id}/restart   -> restart_session
/// GET    /levels                  -> list_levels
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(quiz::create_session))
        .route(
            "/sessions/{id}",
            get(quiz::get_session).delete(quiz::delete_session),
        )
        .route("/sessions/{id}/start", post(quiz::start_session))
        .route("/sessions/{id}/answer", post(quiz::submit_answer))
        .route("/sessions/{id}/messages", post(quiz::send_message))
        .route("/sessions/{id}/restart", post(quiz::restart_session))
        .route("/levels", get(quiz::list_levels))
}

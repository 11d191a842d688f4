//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, auth};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Everything except `/login` requires the `admin` role (enforced by
/// handler extractors).
///
/// ```text
/// POST   /login                          -> login
/// GET    /dashboard                      -> dashboard
/// PUT    /settings                       -> update_settings
/// GET    /participants                   -> list_participants
/// GET    /participants/{email}/history   -> participant_history
/// GET    /ambassadors                    -> list_ambassadors
/// DELETE /results/{id}                   -> delete_result
/// GET    /questions                      -> answer_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/dashboard", get(admin::dashboard))
        .route("/settings", put(admin::update_settings))
        .route("/participants", get(admin::list_participants))
        .route(
            "/participants/{email}/history",
            get(admin::participant_history),
        )
        .route("/ambassadors", get(admin::list_ambassadors))
        .route("/results/{id}", delete(admin::delete_result))
        .route("/questions", get(admin::answer_key))
}

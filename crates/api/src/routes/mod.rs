pub mod admin;
pub mod health;
pub mod quiz;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /quiz/sessions                          create (POST)
/// /quiz/sessions/{id}                     get, abandon (GET, DELETE)
/// /quiz/sessions/{id}/start               bind email, first question (POST)
/// /quiz/sessions/{id}/answer              submit answer (POST)
/// /quiz/sessions/{id}/messages            free-text input (POST)
/// /quiz/sessions/{id}/restart             back to welcome (POST)
/// /quiz/levels                            tier table (GET)
///
/// /admin/login                            operator login (public)
/// /admin/dashboard                        results, settings, score groups
/// /admin/settings                         update settings (PUT)
/// /admin/participants                     per-email summaries
/// /admin/participants/{email}/history     one participant
/// /admin/ambassadors                      latest result perfect
/// /admin/results/{id}                     delete result (DELETE)
/// /admin/questions                        answer key (?difficulty=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/quiz", quiz::router())
        .nest("/admin", admin::router())
}

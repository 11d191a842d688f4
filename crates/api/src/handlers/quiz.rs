//! Handlers for the `/quiz` resource (participant-facing sessions).
//!
//! Actions sent in the wrong session state are not errors: the reply
//! carries `"outcome": "ignored"` and the unchanged session view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use quizline_core::error::CoreError;
use quizline_core::level::{Level, TierTable};
use quizline_core::session::SessionView;
use quizline_db::repositories::LevelRepo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::quiz::actor::CommandReply;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub session: SessionView,
}

/// Request body for `POST /quiz/sessions/{id}/start`.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub email: String,
}

/// Request body for `POST /quiz/sessions/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Zero-based index of the chosen alternative.
    pub option: usize,
}

/// Request body for `POST /quiz/sessions/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/quiz/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionCreated>>)> {
    let handle = state.sessions.create().await;
    let session = handle.view().await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionCreated {
                session_id: handle.id(),
                session,
            },
        }),
    ))
}

/// GET /api/v1/quiz/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let session = state.sessions.get(id).await?.view().await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/quiz/sessions/{id}/start
///
/// Binds the participant email and presents the first question. An invalid
/// email is rejected with 400 and leaves the session idle.
pub async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StartRequest>,
) -> AppResult<Json<DataResponse<CommandReply>>> {
    let reply = state.sessions.get(id).await?.start(input.email).await?;
    Ok(Json(DataResponse { data: reply }))
}

/// POST /api/v1/quiz/sessions/{id}/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AnswerRequest>,
) -> AppResult<Json<DataResponse<CommandReply>>> {
    let reply = state
        .sessions
        .get(id)
        .await?
        .answer(Some(input.option))
        .await?;
    Ok(Json(DataResponse { data: reply }))
}

/// POST /api/v1/quiz/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<MessageRequest>,
) -> AppResult<Json<DataResponse<CommandReply>>> {
    let reply = state.sessions.get(id).await?.send_text(input.text).await?;
    Ok(Json(DataResponse { data: reply }))
}

/// POST /api/v1/quiz/sessions/{id}/restart
pub async fn restart_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<CommandReply>>> {
    let reply = state.sessions.get(id).await?.restart().await?;
    Ok(Json(DataResponse { data: reply }))
}

/// DELETE /api/v1/quiz/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "QuizSession",
            id: id.to_string(),
        }))
    }
}

/// GET /api/v1/quiz/levels
///
/// Falls back to the built-in tiers when none are stored.
pub async fn list_levels(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Level>>>> {
    let table = TierTable::from_levels(LevelRepo::list(&state.pool).await?);
    Ok(Json(DataResponse {
        data: table.levels().to_vec(),
    }))
}

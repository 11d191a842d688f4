//! Handlers for the `/admin` resource (results, participants, settings).
//!
//! All handlers require an operator token via [`AdminSession`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quizline_core::catalog::count_by_difficulty;
use quizline_core::error::CoreError;
use quizline_core::level::TierTable;
use quizline_core::participants::{
    ambassadors, group_by_score, summarize_participants, ParticipantSummary, ResultRecord,
    ScoreGroup,
};
use quizline_core::question::{Difficulty, Question};
use quizline_core::settings::{DifficultyQuota, QuizSettings};
use quizline_core::types::DbId;
use quizline_db::repositories::{LevelRepo, QuestionRepo, QuizResultRepo, SettingsRepo};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::middleware::admin_guard::AdminSession;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub questions_count: i64,
    /// Score descending, then most recent first.
    pub results: Vec<ResultRecord>,
    pub settings: QuizSettings,
    pub score_groups: Vec<ScoreGroup>,
}

/// Request body for `PUT /admin/settings`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_quota"))]
pub struct UpdateSettingsRequest {
    pub timer_enabled: bool,
    #[validate(range(min = 30, max = 600))]
    pub timer_seconds: u32,
    pub difficulty_order_enabled: bool,
    pub show_difficulty_badge: bool,
    pub easy_count: u32,
    pub medium_count: u32,
    pub hard_count: u32,
}

fn validate_quota(input: &UpdateSettingsRequest) -> Result<(), ValidationError> {
    if input.easy_count + input.medium_count + input.hard_count == 0 {
        return Err(ValidationError::new("empty_quota")
            .with_message("At least one question must be drawn per session".into()));
    }
    Ok(())
}

impl From<UpdateSettingsRequest> for QuizSettings {
    fn from(input: UpdateSettingsRequest) -> Self {
        QuizSettings {
            timer_enabled: input.timer_enabled,
            timer_seconds: input.timer_seconds,
            difficulty_order_enabled: input.difficulty_order_enabled,
            show_difficulty_badge: input.show_difficulty_badge,
            quota: DifficultyQuota {
                easy: input.easy_count,
                medium: input.medium_count,
                hard: input.hard_count,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionFilter {
    pub difficulty: Option<String>,
}

/// One row of the answer key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKeyEntry {
    pub id: DbId,
    pub number: i32,
    pub text: String,
    pub difficulty: Difficulty,
    pub topic: String,
    pub correct_key: String,
    pub correct_text: String,
    pub explanation: String,
    pub citation: String,
}

impl From<&Question> for AnswerKeyEntry {
    fn from(q: &Question) -> Self {
        let right = q.correct_alternative();
        AnswerKeyEntry {
            id: q.id,
            number: q.number,
            text: q.text.clone(),
            difficulty: q.difficulty,
            topic: q.topic.clone(),
            correct_key: q.correct_key().to_string(),
            correct_text: right.text.clone(),
            explanation: right.explanation.clone(),
            citation: right.citation.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DifficultyCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AnswerKeyResponse {
    pub questions: Vec<AnswerKeyEntry>,
    pub counts: DifficultyCounts,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let questions_count = QuestionRepo::count(&state.pool).await?;
    let results = load_results(&state).await?;
    let settings = load_settings(&state).await?;
    let score_groups = group_by_score(&results);

    Ok(Json(DataResponse {
        data: DashboardResponse {
            questions_count,
            results,
            settings,
            score_groups,
        },
    }))
}

/// PUT /api/v1/admin/settings
///
/// Replaces every setting in one transaction and returns the stored view.
pub async fn update_settings(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<UpdateSettingsRequest>,
) -> AppResult<Json<DataResponse<QuizSettings>>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    let settings = QuizSettings::from(input);
    settings.validate()?;

    // Scores are ranked against the stored levels, which must cover [0, N].
    let tiers = TierTable::from_levels(LevelRepo::list(&state.pool).await?);
    tiers
        .validate_coverage(settings.total_questions())
        .map_err(|e| {
            CoreError::Validation(format!(
                "Question quota does not match the score levels: {e}"
            ))
        })?;

    SettingsRepo::upsert_many(&state.pool, &settings.to_pairs()).await?;
    tracing::info!(
        timer_enabled = settings.timer_enabled,
        timer_seconds = settings.timer_seconds,
        total_questions = settings.total_questions(),
        "Quiz settings updated"
    );

    Ok(Json(DataResponse {
        data: load_settings(&state).await?,
    }))
}

/// GET /api/v1/admin/participants
pub async fn list_participants(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> AppResult<Json<DataResponse<Vec<ParticipantSummary>>>> {
    let results = load_results(&state).await?;
    Ok(Json(DataResponse {
        data: summarize_participants(&results),
    }))
}

/// GET /api/v1/admin/ambassadors
pub async fn list_ambassadors(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> AppResult<Json<DataResponse<Vec<ParticipantSummary>>>> {
    let results = load_results(&state).await?;
    Ok(Json(DataResponse {
        data: ambassadors(&results),
    }))
}

/// GET /api/v1/admin/participants/{email}/history
pub async fn participant_history(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(email): Path<String>,
) -> AppResult<Json<DataResponse<ParticipantSummary>>> {
    let email = email.trim().to_lowercase();
    let results: Vec<ResultRecord> = QuizResultRepo::list_by_email(&state.pool, &email)
        .await?
        .into_iter()
        .map(ResultRecord::from)
        .collect();

    let summary = summarize_participants(&results)
        .into_iter()
        .next()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id: email,
        }))?;
    Ok(Json(DataResponse { data: summary }))
}

/// DELETE /api/v1/admin/results/{id}
pub async fn delete_result(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if QuizResultRepo::delete(&state.pool, id).await? {
        tracing::info!(result_id = id, "Quiz result deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "QuizResult",
            id: id.to_string(),
        }))
    }
}

/// GET /api/v1/admin/questions?difficulty=
///
/// Answer key of the valid questions, optionally filtered by difficulty.
/// Counts always cover the whole pool.
pub async fn answer_key(
    State(state): State<AppState>,
    _admin: AdminSession,
    Query(filter): Query<QuestionFilter>,
) -> AppResult<Json<DataResponse<AnswerKeyResponse>>> {
    let difficulty = filter
        .difficulty
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(Difficulty::parse)
        .transpose()?;

    let pool = QuestionRepo::list(&state.pool).await?;
    let counts = DifficultyCounts {
        easy: count_by_difficulty(&pool, Difficulty::Easy),
        medium: count_by_difficulty(&pool, Difficulty::Medium),
        hard: count_by_difficulty(&pool, Difficulty::Hard),
        total: pool.len(),
    };

    let questions = pool
        .iter()
        .filter(|q| difficulty.is_none_or(|d| q.difficulty == d))
        .map(AnswerKeyEntry::from)
        .collect();

    Ok(Json(DataResponse {
        data: AnswerKeyResponse { questions, counts },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_results(state: &AppState) -> Result<Vec<ResultRecord>, AppError> {
    Ok(QuizResultRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(ResultRecord::from)
        .collect())
}

async fn load_settings(state: &AppState) -> Result<QuizSettings, AppError> {
    let rows = SettingsRepo::list(&state.pool).await?;
    Ok(QuizSettings::from_pairs(
        rows.iter().map(|r| (r.key.as_str(), r.value.as_str())),
    ))
}

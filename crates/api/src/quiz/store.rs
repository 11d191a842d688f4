//! Postgres-backed catalog source and results writer.

use async_trait::async_trait;
use quizline_core::catalog::{CatalogSource, QuizCatalog};
use quizline_core::error::CoreError;
use quizline_core::level::TierTable;
use quizline_core::results::{NewQuizResult, ResultsWriter};
use quizline_core::settings::QuizSettings;
use quizline_db::models::quiz_result::CreateQuizResult;
use quizline_db::repositories::{LevelRepo, QuestionRepo, QuizResultRepo, SettingsRepo};
use quizline_db::DbPool;

/// Reads questions, tiers and settings for each new session.
///
/// Read failures degrade instead of failing the session: settings and tiers
/// fall back to their defaults, and the question pool to an empty one. A
/// stored quota that disagrees with the stored levels is replaced when the
/// catalog is assembled.
#[derive(Clone)]
pub struct PgCatalogSource {
    pool: DbPool,
}

impl PgCatalogSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_settings(&self) -> QuizSettings {
        match SettingsRepo::list(&self.pool).await {
            Ok(rows) => {
                QuizSettings::from_pairs(rows.iter().map(|r| (r.key.as_str(), r.value.as_str())))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load quiz settings, using defaults");
                QuizSettings::default()
            }
        }
    }

    async fn load_tiers(&self) -> TierTable {
        match LevelRepo::list(&self.pool).await {
            Ok(levels) => TierTable::from_levels(levels),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load levels, using built-in tiers");
                TierTable::builtin()
            }
        }
    }
}

#[async_trait]
impl CatalogSource for PgCatalogSource {
    async fn load_catalog(&self) -> QuizCatalog {
        let settings = self.load_settings().await;
        let tiers = self.load_tiers().await;
        let questions = QuestionRepo::list(&self.pool).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load questions, pool is empty");
            Vec::new()
        });
        QuizCatalog::new(questions, tiers, settings)
    }
}

/// Inserts one `quiz_results` row per completed session.
#[derive(Clone)]
pub struct PgResultsWriter {
    pool: DbPool,
}

impl PgResultsWriter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultsWriter for PgResultsWriter {
    async fn record(&self, result: &NewQuizResult) -> Result<(), CoreError> {
        let input = CreateQuizResult {
            email: result.email.clone(),
            score: result.score as i32,
            total_questions: result.total_questions as i32,
            duration_seconds: i32::try_from(result.duration_seconds).ok(),
        };
        QuizResultRepo::create(&self.pool, &input)
            .await
            .map(|_| ())
            .map_err(|e| CoreError::Internal(format!("Failed to store quiz result: {e}")))
    }
}

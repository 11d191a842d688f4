//! Repository for the `quiz_results` table.

use quizline_core::types::DbId;
use sqlx::PgPool;

use crate::models::quiz_result::{CreateQuizResult, QuizResult};

const COLUMNS: &str = "id, email, score, total_questions, duration_seconds, completed_at";

/// Append-only store of completed sessions. Rows are only ever inserted
/// or deleted.
pub struct QuizResultRepo;

impl QuizResultRepo {
    pub async fn create(pool: &PgPool, input: &CreateQuizResult) -> Result<QuizResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_results (email, score, total_questions, duration_seconds) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizResult>(&query)
            .bind(&input.email)
            .bind(input.score)
            .bind(input.total_questions)
            .bind(input.duration_seconds)
            .fetch_one(pool)
            .await
    }

    /// All results, best score first, newest first within a score.
    pub async fn list(pool: &PgPool) -> Result<Vec<QuizResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_results ORDER BY score DESC, completed_at DESC"
        );
        sqlx::query_as::<_, QuizResult>(&query).fetch_all(pool).await
    }

    /// One participant's results, newest first.
    pub async fn list_by_email(pool: &PgPool, email: &str) -> Result<Vec<QuizResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_results WHERE email = $1 ORDER BY completed_at DESC"
        );
        sqlx::query_as::<_, QuizResult>(&query)
            .bind(email)
            .fetch_all(pool)
            .await
    }

    /// Hard-delete a result. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quiz_results WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Repository for the `quiz_questions` table.

use quizline_core::question::Question;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::question::{CreateQuestion, QuestionRow};

const COLUMNS: &str = "id, number, text, alternatives, difficulty, topic, citation, created_at";

/// Read access to the question pool.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Insert a question, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuestion) -> Result<QuestionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_questions (number, text, alternatives, difficulty, topic, citation) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestionRow>(&query)
            .bind(input.number)
            .bind(&input.text)
            .bind(Json(&input.alternatives))
            .bind(&input.difficulty)
            .bind(&input.topic)
            .bind(&input.citation)
            .fetch_one(pool)
            .await
    }

    /// All rows, ordered by question number.
    pub async fn list_rows(pool: &PgPool) -> Result<Vec<QuestionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_questions ORDER BY number ASC");
        sqlx::query_as::<_, QuestionRow>(&query).fetch_all(pool).await
    }

    /// All valid questions, ordered by number.
    ///
    /// Rows that violate the question invariant are skipped with a warning.
    pub async fn list(pool: &PgPool) -> Result<Vec<Question>, sqlx::Error> {
        let rows = Self::list_rows(pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                row.into_question()
                    .map_err(|e| tracing::warn!(question_id = id, error = %e, "Skipping invalid question row"))
                    .ok()
            })
            .collect())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions")
            .fetch_one(pool)
            .await
    }
}

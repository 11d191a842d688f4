//! Completed-session rows from `quiz_results`.

use quizline_core::participants::ResultRecord;
use quizline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `quiz_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResult {
    pub id: DbId,
    pub email: String,
    pub score: i32,
    pub total_questions: i32,
    pub duration_seconds: Option<i32>,
    pub completed_at: Timestamp,
}

impl From<QuizResult> for ResultRecord {
    fn from(row: QuizResult) -> Self {
        ResultRecord {
            id: row.id,
            email: row.email,
            score: row.score.max(0) as u32,
            total_questions: row.total_questions.max(0) as u32,
            duration_seconds: row.duration_seconds.map(i64::from),
            completed_at: row.completed_at,
        }
    }
}

/// DTO for inserting a result.
#[derive(Debug, Clone)]
pub struct CreateQuizResult {
    pub email: String,
    pub score: i32,
    pub total_questions: i32,
    pub duration_seconds: Option<i32>,
}

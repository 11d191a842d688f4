//! Question rows from `quiz_questions`.

use quizline_core::error::CoreError;
use quizline_core::question::{Alternative, Difficulty, Question};
use quizline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// One alternative as stored in the `alternatives` JSONB column.
///
/// Accepts both the English keys and the original content keys
/// (`texto`, `correta`, `explicacao`, `regulamento_ref`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAlternative {
    #[serde(alias = "texto")]
    pub text: String,
    #[serde(alias = "correta")]
    pub correct: bool,
    #[serde(default, alias = "explicacao")]
    pub explanation: String,
    #[serde(default, alias = "regulamento_ref")]
    pub citation: Option<String>,
}

/// The `A`..`D` object stored in `alternatives`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct AlternativeSet {
    pub A: StoredAlternative,
    pub B: StoredAlternative,
    pub C: StoredAlternative,
    pub D: StoredAlternative,
}

/// Full row from the `quiz_questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: DbId,
    pub number: i32,
    pub text: String,
    pub alternatives: Json<AlternativeSet>,
    pub difficulty: String,
    pub topic: String,
    pub citation: Option<String>,
    pub created_at: Timestamp,
}

impl QuestionRow {
    /// Convert into the validated domain question.
    ///
    /// An alternative without its own citation inherits the question-level
    /// one.
    pub fn into_question(self) -> Result<Question, CoreError> {
        let difficulty = Difficulty::parse(&self.difficulty)?;
        let fallback = self.citation.unwrap_or_default();
        let set = self.alternatives.0;
        let alternatives = [set.A, set.B, set.C, set.D].map(|alt| Alternative {
            text: alt.text,
            correct: alt.correct,
            explanation: alt.explanation,
            citation: alt
                .citation
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| fallback.clone()),
        });
        Question::new(
            self.id,
            self.number,
            self.text,
            alternatives,
            difficulty,
            self.topic,
        )
    }
}

/// DTO for inserting a question.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestion {
    pub number: i32,
    pub text: String,
    pub alternatives: AlternativeSet,
    pub difficulty: String,
    pub topic: String,
    pub citation: Option<String>,
}

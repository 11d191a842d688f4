//! Tier rows from `quiz_levels`.

use quizline_core::level::Level;
use quizline_core::types::DbId;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LevelRow {
    pub id: DbId,
    pub name: String,
    pub emoji: String,
    pub min_score: i32,
    pub max_score: i32,
    pub color: String,
    pub description: String,
}

impl From<LevelRow> for Level {
    fn from(row: LevelRow) -> Self {
        Level {
            name: row.name,
            emoji: row.emoji,
            min_score: row.min_score.max(0) as u32,
            max_score: row.max_score.max(0) as u32,
            color: row.color,
            description: row.description,
        }
    }
}

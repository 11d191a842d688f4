//! Repository for the `quiz_levels` table.

use quizline_core::level::Level;
use sqlx::PgPool;

use crate::models::level::LevelRow;

const COLUMNS: &str = "id, name, emoji, min_score, max_score, color, description";

pub struct LevelRepo;

impl LevelRepo {
    /// All levels, ordered by `min_score`.
    pub async fn list(pool: &PgPool) -> Result<Vec<Level>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_levels ORDER BY min_score ASC");
        let rows = sqlx::query_as::<_, LevelRow>(&query).fetch_all(pool).await?;
        Ok(rows.into_iter().map(Level::from).collect())
    }
}

//! Key/value rows from `quiz_settings`.

use quizline_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}

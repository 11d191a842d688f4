//! Completed-session results handed to the persistence layer.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;

/// Write-once record of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuizResult {
    pub email: String,
    pub score: u32,
    pub total_questions: u32,
    pub duration_seconds: i64,
}

/// Durable sink for completed sessions.
#[async_trait]
pub trait ResultsWriter: Send + Sync {
    async fn record(&self, result: &NewQuizResult) -> Result<(), CoreError>;
}

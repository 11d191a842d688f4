//! Everything a session reads at start: question pool, tiers, settings.

use async_trait::async_trait;

use crate::level::TierTable;
use crate::question::{Difficulty, Question};
use crate::settings::{DifficultyQuota, QuizSettings};

/// Snapshot of the read-only quiz content.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    pub questions: Vec<Question>,
    pub tiers: TierTable,
    pub settings: QuizSettings,
}

impl QuizCatalog {
    /// Assemble a catalog whose quota total matches the tier table.
    ///
    /// See [`QuizCatalog::reconciled`].
    pub fn new(questions: Vec<Question>, tiers: TierTable, settings: QuizSettings) -> Self {
        Self {
            questions,
            tiers,
            settings,
        }
        .reconciled()
    }

    /// Make the tiers cover exactly `[0, N]` for the quota total `N`.
    ///
    /// A quota that disagrees with the tiers is replaced by the default
    /// quota. If the tiers do not cover that either, the built-in tiers are
    /// used as well. The defaults always agree with each other.
    pub fn reconciled(mut self) -> Self {
        let total = self.settings.total_questions();
        let Err(e) = self.tiers.validate_coverage(total) else {
            return self;
        };

        let fallback = DifficultyQuota::default();
        if self.tiers.validate_coverage(fallback.total()).is_ok() {
            tracing::warn!(
                error = %e,
                quota_total = total,
                "Question quota does not match the score levels, using the default quota"
            );
        } else {
            tracing::warn!(
                error = %e,
                quota_total = total,
                "Score levels do not cover the quiz, using built-in levels and the default quota"
            );
            self.tiers = TierTable::builtin();
        }
        self.settings.quota = fallback;
        self
    }
}

/// Number of questions of one difficulty in `questions`.
pub fn count_by_difficulty(questions: &[Question], difficulty: Difficulty) -> usize {
    questions
        .iter()
        .filter(|q| q.difficulty == difficulty)
        .count()
}

/// Reader of the quiz content.
///
/// Implementations never fail: settings and tiers fall back to their
/// defaults when the store cannot be read, and an unreadable question pool
/// yields an empty one.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_catalog(&self) -> QuizCatalog;
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(pub QuizCatalog);

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load_catalog(&self) -> QuizCatalog {
        self.0.clone()
    }
}

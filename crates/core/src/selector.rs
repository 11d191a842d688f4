//! Question pool selection.
//!
//! Draws the per-session question sequence from the full pool according to
//! the difficulty quota. Pure function of the pool, the settings and the
//! injected random source.

use rand::Rng;

use crate::question::{Difficulty, Question};
use crate::settings::QuizSettings;

/// A difficulty tier that held fewer questions than its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortage {
    pub difficulty: Difficulty,
    pub requested: u32,
    pub available: usize,
}

/// Result of a selection run.
#[derive(Debug, Clone)]
pub struct Selection {
    pub questions: Vec<Question>,
    /// Tiers that could not fill their quota. The selection then carries
    /// every question that tier had.
    pub shortages: Vec<Shortage>,
}

/// Uniform in-place permutation (Fisher–Yates).
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Select the session's questions.
///
/// 1. Partition the pool by difficulty.
/// 2. Shuffle each partition independently.
/// 3. Take the quota from each partition (or all it has).
/// 4. Concatenate easy → medium → hard; shuffle once more unless
///    progressive ordering is enabled.
pub fn select_questions<R: Rng + ?Sized>(
    pool: &[Question],
    settings: &QuizSettings,
    rng: &mut R,
) -> Selection {
    let mut questions = Vec::with_capacity(settings.total_questions() as usize);
    let mut shortages = Vec::new();

    for difficulty in Difficulty::ALL {
        let mut partition: Vec<&Question> =
            pool.iter().filter(|q| q.difficulty == difficulty).collect();
        fisher_yates(&mut partition, rng);

        let requested = settings.quota.for_difficulty(difficulty);
        if partition.len() < requested as usize {
            tracing::warn!(
                difficulty = %difficulty,
                requested,
                available = partition.len(),
                "Not enough questions for difficulty quota, using all available",
            );
            shortages.push(Shortage {
                difficulty,
                requested,
                available: partition.len(),
            });
        }

        questions.extend(
            partition
                .into_iter()
                .take(requested as usize)
                .cloned(),
        );
    }

    if !settings.difficulty_order_enabled {
        fisher_yates(&mut questions, rng);
    }

    Selection {
        questions,
        shortages,
    }
}

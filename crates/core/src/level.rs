//! Score tiers ("levels") used for participant feedback.
//!
//! A [`TierTable`] partitions the score range `[0, N]` into ordered,
//! non-overlapping bands. Lookup picks the first band whose
//! `min_score <= score <= max_score`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A named band of final scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub emoji: String,
    pub min_score: u32,
    pub max_score: u32,
    pub color: String,
    pub description: String,
}

impl Level {
    pub fn contains(&self, score: u32) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Ordered tier table. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    levels: Vec<Level>,
}

impl TierTable {
    /// Build a table from stored levels, sorted by `min_score`.
    ///
    /// An empty input yields the built-in table.
    pub fn from_levels(mut levels: Vec<Level>) -> Self {
        if levels.is_empty() {
            return Self::builtin();
        }
        levels.sort_by_key(|l| (l.min_score, l.max_score));
        Self { levels }
    }

    /// Five-band table for a ten-question quiz: 0–3, 4–5, 6–7, 8–9, 10.
    pub fn builtin() -> Self {
        let band = |name: &str, emoji: &str, min, max, color: &str, description: &str| Level {
            name: name.into(),
            emoji: emoji.into(),
            min_score: min,
            max_score: max,
            color: color.into(),
            description: description.into(),
        };
        Self {
            levels: vec![
                band(
                    "Beginner",
                    "🌱",
                    0,
                    3,
                    "bg-secondary",
                    "You're just getting started. Keep studying to level up.",
                ),
                band(
                    "Specialist I",
                    "📚",
                    4,
                    5,
                    "bg-primary/70",
                    "Good progress! You already know the basics of the program.",
                ),
                band(
                    "Specialist II",
                    "⭐",
                    6,
                    7,
                    "bg-primary/85",
                    "Excellent! Your knowledge is consolidating.",
                ),
                band(
                    "Specialist III",
                    "🌟",
                    8,
                    9,
                    "bg-primary",
                    "Impressive! You master almost everything about the program.",
                ),
                band(
                    "Ambassador",
                    "🏆",
                    10,
                    10,
                    "bg-accent",
                    "Perfect! You are a true program specialist.",
                ),
            ],
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// First band containing `score`, if any.
    pub fn level_for(&self, score: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.contains(score))
    }

    /// Band for `score`, falling back to the lowest band when the table
    /// does not cover it.
    pub fn resolve(&self, score: u32) -> &Level {
        match self.level_for(score) {
            Some(level) => level,
            None => {
                tracing::warn!(score, "No tier band covers score, using lowest band");
                &self.levels[0]
            }
        }
    }

    /// Check that the bands fully and disjointly cover `[0, total]`.
    pub fn validate_coverage(&self, total: u32) -> Result<(), CoreError> {
        let mut expected_min = 0u32;
        for level in &self.levels {
            if level.min_score > level.max_score {
                return Err(CoreError::Validation(format!(
                    "Level '{}' has min_score {} above max_score {}",
                    level.name, level.min_score, level.max_score
                )));
            }
            if level.min_score != expected_min {
                return Err(CoreError::Validation(format!(
                    "Level '{}' starts at {} but {} was expected (gap or overlap)",
                    level.name, level.min_score, expected_min
                )));
            }
            expected_min = level.max_score + 1;
        }
        if expected_min != total + 1 {
            return Err(CoreError::Validation(format!(
                "Levels cover scores up to {} but the quiz has {total} questions",
                expected_min.saturating_sub(1)
            )));
        }
        Ok(())
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Admin-controlled quiz settings.
//!
//! Settings are stored as key/value string pairs. Parsing starts from the
//! built-in defaults and overlays every recognised key, so a partially
//! populated (or unreadable) store still yields a playable configuration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::question::Difficulty;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default per-question time limit in seconds.
pub const DEFAULT_TIMER_SECONDS: u32 = 180;

/// Smallest per-question time limit an operator may configure.
pub const MIN_TIMER_SECONDS: u32 = 30;

/// Largest per-question time limit an operator may configure.
pub const MAX_TIMER_SECONDS: u32 = 600;

/// Storage keys of the `quiz_settings` table.
pub mod keys {
    pub const TIMER_ENABLED: &str = "timer_enabled";
    pub const TIMER_SECONDS: &str = "timer_seconds";
    pub const DIFFICULTY_ORDER_ENABLED: &str = "difficulty_order_enabled";
    pub const SHOW_DIFFICULTY_BADGE: &str = "show_difficulty_badge";
    pub const EASY_COUNT: &str = "easy_count";
    pub const MEDIUM_COUNT: &str = "medium_count";
    pub const HARD_COUNT: &str = "hard_count";
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Number of questions drawn per difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyQuota {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl DifficultyQuota {
    pub fn total(&self) -> u32 {
        self.easy + self.medium + self.hard
    }

    pub fn for_difficulty(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for DifficultyQuota {
    fn default() -> Self {
        Self {
            easy: 3,
            medium: 4,
            hard: 3,
        }
    }
}

/// Quiz settings read at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    pub timer_enabled: bool,
    pub timer_seconds: u32,
    pub difficulty_order_enabled: bool,
    pub show_difficulty_badge: bool,
    pub quota: DifficultyQuota,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            timer_enabled: true,
            timer_seconds: DEFAULT_TIMER_SECONDS,
            difficulty_order_enabled: true,
            show_difficulty_badge: true,
            quota: DifficultyQuota::default(),
        }
    }
}

impl QuizSettings {
    /// Number of questions a session draws (`N`).
    pub fn total_questions(&self) -> u32 {
        self.quota.total()
    }

    /// Parse stored key/value pairs on top of the defaults.
    ///
    /// Unknown keys are ignored; values that fail to parse keep the default
    /// and are logged.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            let applied = match key {
                keys::TIMER_ENABLED => parse_bool(value).map(|v| settings.timer_enabled = v),
                keys::TIMER_SECONDS => value.parse::<u32>().ok().map(|v| settings.timer_seconds = v),
                keys::DIFFICULTY_ORDER_ENABLED => {
                    parse_bool(value).map(|v| settings.difficulty_order_enabled = v)
                }
                keys::SHOW_DIFFICULTY_BADGE => {
                    parse_bool(value).map(|v| settings.show_difficulty_badge = v)
                }
                keys::EASY_COUNT => value.parse::<u32>().ok().map(|v| settings.quota.easy = v),
                keys::MEDIUM_COUNT => value.parse::<u32>().ok().map(|v| settings.quota.medium = v),
                keys::HARD_COUNT => value.parse::<u32>().ok().map(|v| settings.quota.hard = v),
                _ => Some(()),
            };
            if applied.is_none() {
                tracing::warn!(key, value, "Unparsable quiz setting, keeping default");
            }
        }

        if let Err(e) = settings.validate() {
            tracing::warn!(error = %e, "Stored quiz settings are invalid, using defaults");
            return Self::default();
        }
        settings
    }

    /// Serialize to the key/value pairs stored in `quiz_settings`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::TIMER_ENABLED, self.timer_enabled.to_string()),
            (keys::TIMER_SECONDS, self.timer_seconds.to_string()),
            (
                keys::DIFFICULTY_ORDER_ENABLED,
                self.difficulty_order_enabled.to_string(),
            ),
            (
                keys::SHOW_DIFFICULTY_BADGE,
                self.show_difficulty_badge.to_string(),
            ),
            (keys::EASY_COUNT, self.quota.easy.to_string()),
            (keys::MEDIUM_COUNT, self.quota.medium.to_string()),
            (keys::HARD_COUNT, self.quota.hard.to_string()),
        ]
    }

    /// Validate operator-facing bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(MIN_TIMER_SECONDS..=MAX_TIMER_SECONDS).contains(&self.timer_seconds) {
            return Err(CoreError::Validation(format!(
                "timer_seconds must be between {MIN_TIMER_SECONDS} and {MAX_TIMER_SECONDS}, got {}",
                self.timer_seconds
            )));
        }
        if self.quota.total() == 0 {
            return Err(CoreError::Validation(
                "At least one question must be drawn per session".into(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

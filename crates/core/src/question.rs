//! Quiz question model.
//!
//! A [`Question`] always carries exactly four labelled alternatives (A–D),
//! and exactly one of them is correct. The constructor enforces that
//! invariant so the rest of the core can index the correct alternative
//! without re-checking.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Number of alternatives every question carries.
pub const ALTERNATIVE_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Difficulty tier of a question.
///
/// Ordering follows the progressive presentation order: easy < medium < hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers in progressive order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Canonical storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse a stored difficulty label.
    ///
    /// Accepts the canonical English labels as well as the Portuguese labels
    /// used by the quiz content (`fácil`, `média`, `difícil`), case-insensitively.
    pub fn parse(label: &str) -> Result<Self, CoreError> {
        match label.trim().to_lowercase().as_str() {
            "easy" | "fácil" | "facil" => Ok(Self::Easy),
            "medium" | "média" | "media" => Ok(Self::Medium),
            "hard" | "difícil" | "dificil" => Ok(Self::Hard),
            other => Err(CoreError::Validation(format!(
                "Unknown difficulty '{other}'. Expected easy, medium or hard"
            ))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Option keys
// ---------------------------------------------------------------------------

/// Label of one of the four alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; ALTERNATIVE_COUNT] =
        [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    /// Zero-based position of this key.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// Key at a zero-based position, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// One answer alternative with its explanation and regulatory citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub text: String,
    pub correct: bool,
    pub explanation: String,
    pub citation: String,
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: DbId,
    pub number: i32,
    pub text: String,
    pub difficulty: Difficulty,
    pub topic: String,
    alternatives: [Alternative; ALTERNATIVE_COUNT],
    correct: OptionKey,
}

impl Question {
    /// Build a question, checking that the prompt is non-empty and that
    /// exactly one alternative is marked correct.
    pub fn new(
        id: DbId,
        number: i32,
        text: impl Into<String>,
        alternatives: [Alternative; ALTERNATIVE_COUNT],
        difficulty: Difficulty,
        topic: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Question {number} has an empty prompt"
            )));
        }

        let correct_keys: Vec<OptionKey> = OptionKey::ALL
            .iter()
            .copied()
            .filter(|key| alternatives[key.index()].correct)
            .collect();

        let correct = match correct_keys.as_slice() {
            [key] => *key,
            keys => {
                return Err(CoreError::Validation(format!(
                    "Question {number} must have exactly one correct alternative, found {}",
                    keys.len()
                )))
            }
        };

        Ok(Self {
            id,
            number,
            text,
            difficulty,
            topic: topic.into(),
            alternatives,
            correct,
        })
    }

    pub fn alternatives(&self) -> &[Alternative; ALTERNATIVE_COUNT] {
        &self.alternatives
    }

    pub fn alternative(&self, key: OptionKey) -> &Alternative {
        &self.alternatives[key.index()]
    }

    pub fn correct_key(&self) -> OptionKey {
        self.correct
    }

    pub fn correct_alternative(&self) -> &Alternative {
        self.alternative(self.correct)
    }

    /// Whether a submitted choice is correct. `None` (a timeout) never is.
    pub fn is_correct(&self, choice: Option<usize>) -> bool {
        choice == Some(self.correct.index())
    }

    /// Display labels for the four options, e.g. `"A) ..."`.
    pub fn option_labels(&self) -> Vec<String> {
        OptionKey::ALL
            .iter()
            .map(|key| format!("{key}) {}", self.alternative(*key).text))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a question whose alternative at `correct` is the right one.
    pub fn question(id: DbId, difficulty: Difficulty, correct: usize) -> Question {
        let alternatives = std::array::from_fn(|i| Alternative {
            text: format!("Option {i} of question {id}"),
            correct: i == correct,
            explanation: format!("Explanation {i} of question {id}"),
            citation: format!("Rule {id}.{i}"),
        });
        Question::new(
            id,
            id as i32,
            format!("Question {id}?"),
            alternatives,
            difficulty,
            "program",
        )
        .expect("fixture question is valid")
    }

    /// A pool with `easy`, `medium` and `hard` questions, ids assigned in
    /// that order starting at 1. The correct answer is always option B.
    pub fn pool(easy: usize, medium: usize, hard: usize) -> Vec<Question> {
        let mut out = Vec::new();
        let mut id = 1;
        for (difficulty, count) in [
            (Difficulty::Easy, easy),
            (Difficulty::Medium, medium),
            (Difficulty::Hard, hard),
        ] {
            for _ in 0..count {
                out.push(question(id, difficulty, 1));
                id += 1;
            }
        }
        out
    }
}

//! Admin aggregates over stored results: per-participant summaries,
//! ambassadors and score distribution.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A stored result as the admin views see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: DbId,
    pub email: String,
    pub score: u32,
    pub total_questions: u32,
    pub duration_seconds: Option<i64>,
    pub completed_at: Timestamp,
}

impl ResultRecord {
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.score == self.total_questions
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub email: String,
    pub latest_result: ResultRecord,
    /// Newest first.
    pub all_results: Vec<ResultRecord>,
    pub participation_count: usize,
    pub best_score: u32,
    pub first_participation: Timestamp,
    pub last_participation: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreGroup {
    pub score: u32,
    pub count: usize,
    pub results: Vec<ResultRecord>,
}

/// Group results by email, most recently active participant first.
pub fn summarize_participants(results: &[ResultRecord]) -> Vec<ParticipantSummary> {
    let mut by_email: HashMap<&str, Vec<ResultRecord>> = HashMap::new();
    for result in results {
        by_email
            .entry(result.email.as_str())
            .or_default()
            .push(result.clone());
    }

    let mut summaries: Vec<ParticipantSummary> = by_email
        .into_iter()
        .filter_map(|(email, mut all)| {
            all.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
            let latest = all.first()?.clone();
            let oldest = all.last()?;
            Some(ParticipantSummary {
                email: email.to_string(),
                participation_count: all.len(),
                best_score: all.iter().map(|r| r.score).max().unwrap_or(0),
                first_participation: oldest.completed_at,
                last_participation: latest.completed_at,
                latest_result: latest,
                all_results: all,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.last_participation
            .cmp(&a.last_participation)
            .then_with(|| a.email.cmp(&b.email))
    });
    summaries
}

/// Participants whose most recent attempt was a perfect score.
pub fn ambassadors(results: &[ResultRecord]) -> Vec<ParticipantSummary> {
    summarize_participants(results)
        .into_iter()
        .filter(|p| p.latest_result.is_perfect())
        .collect()
}

/// Results bucketed by score, highest score first.
pub fn group_by_score(results: &[ResultRecord]) -> Vec<ScoreGroup> {
    let mut buckets: BTreeMap<u32, Vec<ResultRecord>> = BTreeMap::new();
    for result in results {
        buckets.entry(result.score).or_default().push(result.clone());
    }
    buckets
        .into_iter()
        .rev()
        .map(|(score, results)| ScoreGroup {
            score,
            count: results.len(),
            results,
        })
        .collect()
}

/// `"3min 7s"`, or `"-"` when unknown.
pub fn format_duration(seconds: Option<i64>) -> String {
    match seconds {
        Some(s) if s > 0 => format!("{}min {}s", s / 60, s % 60),
        _ => "-".to_string(),
    }
}

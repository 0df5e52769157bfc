//! Personal-record detection for a just-finished session.
//!
//! The all-time best is taken over *every* historical set, warm-ups
//! included, while the candidate from the finished session only considers
//! working sets. A heavy historical warm-up therefore raises the bar a new
//! working set has to clear.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::workout::SetRecord;

/// A new all-time best working weight for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub exercise_key: String,
    pub new_best_weight: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PersonalRecordDetector;

impl PersonalRecordDetector {
    pub fn new() -> Self {
        Self
    }

    /// Heaviest weight per exercise over `history`.
    pub fn all_time_best<'a, I>(&self, history: I) -> HashMap<&'a str, f64>
    where
        I: IntoIterator<Item = &'a SetRecord>,
    {
        let mut best: HashMap<&str, f64> = HashMap::new();
        for set in history {
            if let Some(exercise) = set.exercise_key.as_deref() {
                let entry = best.entry(exercise).or_insert(0.0);
                *entry = entry.max(set.weight);
            }
        }
        best
    }

    /// Records set by `finished` against `history`, in the order each
    /// exercise first appears in `finished`.
    ///
    /// `history` must not contain the finished session's own sets.
    pub fn detect(&self, history: &[SetRecord], finished: &[SetRecord]) -> Vec<PersonalRecord> {
        let best = self.all_time_best(history);

        let mut candidates: IndexMap<&str, f64> = IndexMap::new();
        for set in finished.iter().filter(|s| !s.is_warmup && s.weight > 0.0) {
            if let Some(exercise) = set.exercise_key.as_deref() {
                let entry = candidates.entry(exercise).or_insert(set.weight);
                *entry = entry.max(set.weight);
            }
        }

        candidates
            .into_iter()
            .filter(|(exercise, candidate)| {
                *candidate > best.get(exercise).copied().unwrap_or(0.0)
            })
            .map(|(exercise, candidate)| PersonalRecord {
                exercise_key: exercise.to_string(),
                new_best_weight: candidate,
            })
            .collect()
    }
}

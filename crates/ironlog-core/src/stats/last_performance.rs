//! "Last time" lookups for each exercise.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::workout::WorkoutSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPerformance {
    pub exercise_key: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
}

/// For every exercise, the first set logged in the most recent session
/// that contains it. Ties on date go to the higher session id.
///
/// Results are ordered most recent first.
pub fn last_performances(sessions: &[WorkoutSession]) -> Vec<LastPerformance> {
    let mut ordered: Vec<&WorkoutSession> = sessions.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut last: IndexMap<&str, LastPerformance> = IndexMap::new();
    for session in ordered {
        let mut sets: Vec<_> = session.sets.iter().collect();
        sets.sort_by_key(|s| s.order);
        for set in sets {
            let Some(exercise) = set.exercise_key.as_deref() else {
                continue;
            };
            last.entry(exercise).or_insert_with(|| LastPerformance {
                exercise_key: exercise.to_string(),
                date: session.date,
                weight: set.weight,
                reps: set.reps,
            });
        }
    }
    last.into_values().collect()
}

/// Last performance for a single exercise.
pub fn last_performance(sessions: &[WorkoutSession], exercise: &str) -> Option<LastPerformance> {
    last_performances(sessions)
        .into_iter()
        .find(|p| p.exercise_key == exercise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::SetRecord;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn numbered(mut sets: Vec<SetRecord>) -> Vec<SetRecord> {
        for (i, set) in sets.iter_mut().enumerate() {
            set.order = i as u32 + 1;
        }
        sets
    }

    #[test]
    fn picks_first_set_of_most_recent_session() {
        let sessions = vec![
            WorkoutSession {
                id: 1,
                date: date(5),
                sets: numbered(vec![
                    SetRecord::working("Squat", 100.0, 5),
                    SetRecord::working("Deadlift", 140.0, 3),
                ]),
            },
            WorkoutSession {
                id: 2,
                date: date(12),
                sets: numbered(vec![
                    SetRecord::warmup("Squat", 60.0, 8),
                    SetRecord::working("Squat", 105.0, 5),
                ]),
            },
        ];

        let squat = last_performance(&sessions, "Squat").unwrap();
        assert_eq!((squat.date, squat.weight, squat.reps), (date(12), 60.0, 8));

        let deadlift = last_performance(&sessions, "Deadlift").unwrap();
        assert_eq!(deadlift.date, date(5));
        assert!(last_performance(&sessions, "Bench Press").is_none());
    }

    #[test]
    fn same_day_sessions_prefer_the_later_one() {
        let sessions = vec![
            WorkoutSession {
                id: 7,
                date: date(12),
                sets: numbered(vec![SetRecord::working("Squat", 100.0, 5)]),
            },
            WorkoutSession {
                id: 3,
                date: date(12),
                sets: numbered(vec![SetRecord::working("Squat", 90.0, 5)]),
            },
        ];
        assert_eq!(last_performance(&sessions, "Squat").unwrap().weight, 100.0);
    }
}

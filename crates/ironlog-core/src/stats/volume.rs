//! Training volume aggregation.
//!
//! Volume is `weight × reps` summed over sets. The aggregator filters
//! sessions by a trailing time window and produces a total plus one bar
//! per group, scaled so the largest bar is 100 %.

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::workout::{MuscleGroupMap, WorkoutSession};

/// Trailing window applied to session dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeWindow {
    Last7Days,
    Last30Days,
    #[default]
    AllTime,
}

impl VolumeWindow {
    /// Earliest included date, or `None` for no lower bound.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            VolumeWindow::Last7Days => Some(today - Duration::days(7)),
            VolumeWindow::Last30Days => Some(today - Duration::days(30)),
            VolumeWindow::AllTime => None,
        }
    }

    pub fn includes(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.cutoff(today).map_or(true, |cutoff| date >= cutoff)
    }
}

impl FromStr for VolumeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" | "last_7_days" => Ok(VolumeWindow::Last7Days),
            "30d" | "last_30_days" => Ok(VolumeWindow::Last30Days),
            "all" | "all_time" => Ok(VolumeWindow::AllTime),
            other => Err(format!("unknown window '{other}' (expected 7d, 30d or all)")),
        }
    }
}

impl fmt::Display for VolumeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeWindow::Last7Days => "7d",
            VolumeWindow::Last30Days => "30d",
            VolumeWindow::AllTime => "all",
        })
    }
}

/// How sets are bucketed into bars.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    MuscleGroup(MuscleGroupMap),
    Exercise,
}

impl Grouping {
    fn label<'a>(&'a self, exercise: &'a str) -> &'a str {
        match self {
            Grouping::MuscleGroup(map) => map.group_for(exercise),
            Grouping::Exercise => exercise,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBar {
    pub label: String,
    pub total_volume: f64,
    /// Share of the largest bar, 0.0 ..= 100.0.
    pub percentage_of_max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    /// Sessions that survived the window filter.
    pub total_sessions: usize,
    pub total_volume: f64,
    /// Sorted by volume, largest first.
    pub bars: Vec<VolumeBar>,
}

#[derive(Debug, Clone)]
pub struct VolumeAggregator {
    pub window: VolumeWindow,
    pub grouping: Grouping,
}

impl VolumeAggregator {
    pub fn new(window: VolumeWindow, grouping: Grouping) -> Self {
        Self { window, grouping }
    }

    pub fn aggregate(&self, sessions: &[WorkoutSession], today: NaiveDate) -> VolumeReport {
        let mut total_sessions = 0;
        let mut total_volume = 0.0;
        // Insertion order breaks ties between equal volumes.
        let mut by_label: IndexMap<&str, f64> = IndexMap::new();

        for session in sessions
            .iter()
            .filter(|s| self.window.includes(s.date, today))
        {
            total_sessions += 1;
            for set in &session.sets {
                let volume = set.volume();
                total_volume += volume;
                if let Some(exercise) = set.exercise_key.as_deref() {
                    *by_label.entry(self.grouping.label(exercise)).or_insert(0.0) += volume;
                }
            }
        }

        let max_volume = by_label.values().copied().fold(1.0_f64, f64::max);
        let mut bars: Vec<VolumeBar> = by_label
            .into_iter()
            .map(|(label, volume)| VolumeBar {
                label: label.to_string(),
                total_volume: volume,
                percentage_of_max: volume / max_volume * 100.0,
            })
            .collect();
        // Stable: equal volumes keep first-seen order.
        bars.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));

        VolumeReport {
            total_sessions,
            total_volume,
            bars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::SetRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(id: i64, date: NaiveDate, sets: Vec<SetRecord>) -> WorkoutSession {
        WorkoutSession { id, date, sets }
    }

    fn legs_map() -> MuscleGroupMap {
        [("Squat", "Legs"), ("Leg Press", "Legs")].into_iter().collect()
    }

    #[test]
    fn totals_and_single_group_bar() {
        let today = date(2026, 10, 19);
        let sessions = vec![session(
            1,
            today,
            vec![
                SetRecord::working("Squat", 100.0, 5),
                SetRecord::working("Leg Press", 80.0, 8),
            ],
        )];
        let report = VolumeAggregator::new(VolumeWindow::AllTime, Grouping::MuscleGroup(legs_map()))
            .aggregate(&sessions, today);

        assert_eq!(report.total_sessions, 1);
        assert_eq!(report.total_volume, 1140.0);
        assert_eq!(
            report.bars,
            vec![VolumeBar {
                label: "Legs".into(),
                total_volume: 1140.0,
                percentage_of_max: 100.0,
            }]
        );
    }

    #[test]
    fn seven_day_cutoff_is_inclusive() {
        let today = date(2026, 10, 19);
        let sessions = vec![
            session(1, date(2026, 10, 12), vec![SetRecord::working("Squat", 100.0, 1)]),
            session(2, date(2026, 10, 11), vec![SetRecord::working("Squat", 50.0, 1)]),
        ];
        let report = VolumeAggregator::new(VolumeWindow::Last7Days, Grouping::Exercise)
            .aggregate(&sessions, today);
        assert_eq!(report.total_sessions, 1);
        assert_eq!(report.total_volume, 100.0);

        let month = VolumeAggregator::new(VolumeWindow::Last30Days, Grouping::Exercise)
            .aggregate(&sessions, today);
        assert_eq!(month.total_sessions, 2);
    }

    #[test]
    fn unmapped_exercises_go_to_other_and_unnamed_sets_only_count_in_total() {
        let today = date(2026, 10, 19);
        let unnamed = SetRecord {
            exercise_key: None,
            ..SetRecord::working("ignored", 20.0, 10)
        };
        let sessions = vec![session(
            1,
            today,
            vec![
                SetRecord::working("Squat", 100.0, 5),
                SetRecord::working("Cable Fly", 10.0, 10),
                unnamed,
            ],
        )];
        let report = VolumeAggregator::new(VolumeWindow::AllTime, Grouping::MuscleGroup(legs_map()))
            .aggregate(&sessions, today);
        assert_eq!(report.total_volume, 800.0);
        let labels: Vec<_> = report.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Legs", "Other"]);
        assert_eq!(report.bars[1].percentage_of_max, 20.0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let today = date(2026, 10, 19);
        let sessions = vec![session(
            1,
            today,
            vec![
                SetRecord::working("Row", 50.0, 10),
                SetRecord::working("Curl", 25.0, 20),
                SetRecord::working("Squat", 100.0, 10),
            ],
        )];
        let report =
            VolumeAggregator::new(VolumeWindow::AllTime, Grouping::Exercise).aggregate(&sessions, today);
        let labels: Vec<_> = report.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Squat", "Row", "Curl"]);
    }

    #[test]
    fn empty_input_has_no_bars() {
        let report = VolumeAggregator::new(VolumeWindow::Last7Days, Grouping::Exercise)
            .aggregate(&[], date(2026, 10, 19));
        assert_eq!(report, VolumeReport::default());
    }

    #[test]
    fn zero_volume_bars_do_not_divide_by_zero() {
        let today = date(2026, 10, 19);
        let sessions = vec![session(1, today, vec![SetRecord::working("Plank", 0.0, 3)])];
        let report =
            VolumeAggregator::new(VolumeWindow::AllTime, Grouping::Exercise).aggregate(&sessions, today);
        assert_eq!(report.bars[0].percentage_of_max, 0.0);
    }

    #[test]
    fn parses_window_names() {
        assert_eq!("7d".parse(), Ok(VolumeWindow::Last7Days));
        assert_eq!("ALL".parse(), Ok(VolumeWindow::AllTime));
        assert!("1y".parse::<VolumeWindow>().is_err());
    }
}

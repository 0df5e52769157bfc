//! Weekly training streaks.
//!
//! A streak is the number of consecutive calendar weeks, ending with the
//! current one, that contain at least one session.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Week numbering used to bucket dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekScheme {
    /// Week 1 starts on January 1st and every week is seven days from
    /// there, so the last week of a year (53) is one or two days long.
    #[default]
    JanuaryAnchored,
    /// ISO-8601 weeks (Monday start, week 1 contains the first Thursday).
    Iso8601,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekScheme {
    pub fn key(&self, date: NaiveDate) -> WeekKey {
        match self {
            WeekScheme::JanuaryAnchored => WeekKey {
                year: date.year(),
                week: date.ordinal0() / 7 + 1,
            },
            WeekScheme::Iso8601 => {
                let iso = date.iso_week();
                WeekKey {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
        }
    }

    /// The week immediately before `key`.
    pub fn previous(&self, key: WeekKey) -> WeekKey {
        match self {
            WeekScheme::JanuaryAnchored => {
                if key.week > 1 {
                    WeekKey {
                        week: key.week - 1,
                        ..key
                    }
                } else {
                    // Dec 31st is always day 365 or 366, i.e. week 53.
                    WeekKey {
                        year: key.year - 1,
                        week: 53,
                    }
                }
            }
            WeekScheme::Iso8601 => NaiveDate::from_isoywd_opt(key.year, key.week, Weekday::Mon)
                .map(|monday| self.key(monday - Duration::days(7)))
                .unwrap_or(WeekKey {
                    week: key.week.saturating_sub(1),
                    ..key
                }),
        }
    }
}

impl FromStr for WeekScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "january_anchored" | "jan1" => Ok(WeekScheme::JanuaryAnchored),
            "iso8601" | "iso" => Ok(WeekScheme::Iso8601),
            other => Err(format!("unknown week scheme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreakCalculator {
    scheme: WeekScheme,
}

impl StreakCalculator {
    pub fn new(scheme: WeekScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> WeekScheme {
        self.scheme
    }

    /// Consecutive weeks with a session, counting back from the week
    /// containing `today`. A current week without a session yields 0.
    pub fn current_streak<I>(&self, session_dates: I, today: NaiveDate) -> u32
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let weeks: BTreeSet<WeekKey> = session_dates
            .into_iter()
            .map(|d| self.scheme.key(d))
            .collect();

        let current = self.scheme.key(today);
        let mut expected = current;
        let mut streak = 0;
        // Newest first; sessions dated after the current week are ignored.
        for week in weeks.iter().rev().skip_while(|w| **w > current) {
            if *week != expected {
                break;
            }
            streak += 1;
            expected = self.scheme.previous(expected);
        }
        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn three_consecutive_weeks() {
        let calc = StreakCalculator::default();
        let today = date(2026, 10, 19);
        let dates = [date(2026, 10, 19), date(2026, 10, 12), date(2026, 10, 5)];
        assert_eq!(calc.current_streak(dates, today), 3);
    }

    #[test]
    fn gap_stops_the_count() {
        let calc = StreakCalculator::default();
        let today = date(2026, 10, 19);
        let dates = [date(2026, 10, 19), date(2026, 10, 5)];
        assert_eq!(calc.current_streak(dates, today), 1);
    }

    #[test]
    fn empty_history_and_idle_current_week_are_zero() {
        let calc = StreakCalculator::default();
        let today = date(2026, 10, 19);
        assert_eq!(calc.current_streak(Vec::<NaiveDate>::new(), today), 0);
        assert_eq!(calc.current_streak([date(2026, 10, 12)], today), 0);
    }

    #[test]
    fn duplicates_and_future_dates_do_not_inflate() {
        let calc = StreakCalculator::default();
        let today = date(2026, 10, 19);
        let dates = [
            date(2026, 11, 30),
            date(2026, 10, 19),
            date(2026, 10, 18),
            date(2026, 10, 12),
        ];
        assert_eq!(calc.current_streak(dates, today), 2);
    }

    #[test]
    fn future_weeks_are_skipped_before_counting_back() {
        let calc = StreakCalculator::default();
        let today = date(2026, 10, 19);
        let dates = [
            date(2026, 12, 7),
            date(2026, 10, 26),
            date(2026, 10, 19),
            date(2026, 10, 12),
            date(2026, 10, 5),
        ];
        assert_eq!(calc.current_streak(dates, today), 3);
    }

    #[test]
    fn january_anchored_crosses_year_boundary() {
        let calc = StreakCalculator::new(WeekScheme::JanuaryAnchored);
        let today = date(2027, 1, 3);
        // (2027, 1), (2026, 53), (2026, 52)
        let dates = [date(2027, 1, 2), date(2026, 12, 31), date(2026, 12, 28)];
        assert_eq!(calc.current_streak(dates, today), 3);
    }

    #[test]
    fn iso_weeks_bucket_the_same_dates_differently() {
        let calc = StreakCalculator::new(WeekScheme::Iso8601);
        let today = date(2027, 1, 3);
        // All three fall in 2026-W53.
        let dates = [date(2027, 1, 2), date(2026, 12, 31), date(2026, 12, 28)];
        assert_eq!(calc.current_streak(dates, today), 1);

        let with_prior_week = [date(2027, 1, 2), date(2026, 12, 27)];
        assert_eq!(calc.current_streak(with_prior_week, today), 2);
    }

    #[test]
    fn iso_previous_of_week_one_is_last_week_of_prior_year() {
        let prev = WeekScheme::Iso8601.previous(WeekKey { year: 2027, week: 1 });
        assert_eq!(prev, WeekKey { year: 2026, week: 53 });
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, ValidationError};
use crate::workout::{NewSession, SetRecord, WorkoutSession};

/// Inclusive range of session dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Range covering `start ..= end`. A start after the end is rejected.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Everything from `start` on.
    pub fn since(start: NaiveDate) -> Self {
        Self {
            start,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Read and append access to logged workouts.
///
/// Fetches return the complete result or an error, never a partial list.
pub trait WorkoutStore {
    /// Sessions ordered by date then id, optionally limited to `range`.
    fn sessions(&self, range: Option<DateRange>) -> Result<Vec<WorkoutSession>, StoreError>;

    /// Every set ever logged, warm-ups included.
    fn historical_sets(&self) -> Result<Vec<SetRecord>, StoreError>;

    fn append_session(&mut self, session: &NewSession) -> Result<WorkoutSession, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        let range = DateRange::new(date(10, 12), date(10, 19)).unwrap();
        assert!(range.contains(date(10, 12)));
        assert!(range.contains(date(10, 19)));
        assert!(!range.contains(date(10, 20)));
        assert!(DateRange::since(date(1, 1)).contains(date(12, 31)));

        let single = DateRange::new(date(10, 12), date(10, 12)).unwrap();
        assert!(single.contains(date(10, 12)));
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert_eq!(
            DateRange::new(date(10, 19), date(10, 12)),
            Err(ValidationError::ReversedRange {
                start: date(10, 19),
                end: date(10, 12),
            })
        );
    }
}

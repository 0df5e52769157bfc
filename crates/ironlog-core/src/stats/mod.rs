//! Workout analytics.
//!
//! Everything here is a pure function over sessions or sets already
//! fetched from a [`WorkoutStore`](crate::storage::WorkoutStore): weekly
//! streaks, volume per muscle group or exercise, personal records,
//! estimated one-rep maxes, last-performance lookups and per-plan progress.

mod last_performance;
mod one_rep_max;
mod personal_record;
mod plan_progress;
mod streak;
mod volume;

pub use last_performance::{last_performance, last_performances, LastPerformance};
pub use one_rep_max::{best_estimates, epley, OneRepMax};
pub use personal_record::{PersonalRecord, PersonalRecordDetector};
pub use plan_progress::{plan_progress, ExerciseProgress};
pub use streak::{StreakCalculator, WeekKey, WeekScheme};
pub use volume::{Grouping, VolumeAggregator, VolumeBar, VolumeReport, VolumeWindow};

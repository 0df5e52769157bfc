//! # Ironlog Core Library
//!
//! This library provides the core logic for the Ironlog workout tracker.
//! It follows a CLI-first philosophy: every operation is available through
//! the standalone `ironlog` binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Interval timer**: a one-second state machine alternating WORK and
//!   REST phases. Every tick persists a snapshot, and a new engine resumes
//!   from it as if it had been ticking all along
//! - **Analytics**: pure functions over logged sessions (weekly streaks,
//!   volume per muscle group, personal records, estimated one-rep max)
//! - **Storage**: SQLite-based workout storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: interval timer state machine
//! - [`TickLoop`]: tokio task that ticks an engine once per second
//! - [`Database`]: session storage, also the timer's snapshot store
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod workout;

pub use error::{ConfigError, CoreError, StoreError, TimerError, ValidationError};
pub use events::Event;
pub use stats::{
    PersonalRecord, PersonalRecordDetector, StreakCalculator, VolumeAggregator, VolumeReport,
    VolumeWindow, WeekScheme,
};
pub use storage::{Config, Database, DateRange, WorkoutStore};
pub use timer::{Phase, Preset, TickLoop, TimerEngine, TimerSnapshot, TimerStatus};
pub use workout::{MuscleGroupMap, NewSession, PlannedExercise, SetRecord, WorkoutPlan, WorkoutSession};

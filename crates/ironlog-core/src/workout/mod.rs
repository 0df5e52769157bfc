//! Workout data as the analytics see it, plus the training plans sessions
//! are logged against.
//!
//! Sessions and sets are owned by the workout store; everything here is a
//! read-only copy taken for the duration of a computation.

mod model;
mod muscle;
mod plan;

pub use model::{NewSession, SetRecord, WorkoutSession};
pub use muscle::{MuscleGroupMap, OTHER_GROUP};
pub use plan::{
    search_catalogue, CatalogueEntry, PlannedExercise, WorkoutPlan, DEFAULT_PLAN_REPS,
    DEFAULT_PLAN_SETS, EXERCISE_CATALOGUE,
};

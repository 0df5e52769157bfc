//! What was done last time for each exercise of a plan.

use serde::{Deserialize, Serialize};

use super::last_performance::{last_performances, LastPerformance};
use super::one_rep_max::best_estimates;
use crate::workout::{WorkoutPlan, WorkoutSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: String,
    pub last: Option<LastPerformance>,
    pub best_one_rep_max: Option<f64>,
}

/// One entry per plan exercise, in plan order. Exercises never logged
/// have neither a last performance nor an estimate.
pub fn plan_progress(plan: &WorkoutPlan, sessions: &[WorkoutSession]) -> Vec<ExerciseProgress> {
    let last = last_performances(sessions);
    let best = best_estimates(sessions.iter().flat_map(|s| &s.sets));
    plan.exercises
        .iter()
        .map(|exercise| ExerciseProgress {
            name: exercise.name.clone(),
            target_sets: exercise.sets,
            target_reps: exercise.reps.clone(),
            last: last.iter().find(|p| p.exercise_key == exercise.name).cloned(),
            best_one_rep_max: best
                .iter()
                .find(|e| e.exercise_key == exercise.name)
                .map(|e| e.estimate),
        })
        .collect()
}

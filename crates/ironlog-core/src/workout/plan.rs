//! Training plans and the exercise catalogue they are built from.
//!
//! Two plans ship with the app ("Day A" and "Day B"). Users add their own
//! named plans of `{name, sets, reps}` entries; those live in the
//! database's `plans` table.

use serde::{Deserialize, Serialize};

use super::muscle::MuscleGroupMap;
use crate::error::ValidationError;

pub const DEFAULT_PLAN_SETS: u32 = 3;
pub const DEFAULT_PLAN_REPS: &str = "8-12";
pub const MAX_PLAN_SETS: u32 = 10;
pub const MAX_PLAN_NAME_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub name: &'static str,
    pub muscle_group: &'static str,
}

const fn entry(name: &'static str, muscle_group: &'static str) -> CatalogueEntry {
    CatalogueEntry { name, muscle_group }
}

/// Exercises offered when building a plan, grouped by muscle.
pub const EXERCISE_CATALOGUE: [CatalogueEntry; 27] = [
    entry("Bench Press", "Chest"),
    entry("Incline Bench Press", "Chest"),
    entry("Dumbbell Fly", "Chest"),
    entry("Dips", "Chest"),
    entry("Pull-Up", "Back"),
    entry("Close-Grip Pull-Up", "Back"),
    entry("Barbell Row (Underhand)", "Back"),
    entry("Barbell Row (Overhand)", "Back"),
    entry("Deadlift", "Back"),
    entry("Machine Row", "Back"),
    entry("Squat", "Legs"),
    entry("Leg Press", "Legs"),
    entry("Lunge", "Legs"),
    entry("Leg Extension", "Legs"),
    entry("Romanian Deadlift", "Legs"),
    entry("Overhead Press (Barbell)", "Shoulders"),
    entry("Machine Shoulder Press", "Shoulders"),
    entry("Lateral Raise", "Shoulders"),
    entry("Face Pull", "Shoulders"),
    entry("Barbell Curl", "Biceps"),
    entry("EZ-Bar Curl", "Biceps"),
    entry("Hammer Curl", "Biceps"),
    entry("Concentration Curl", "Biceps"),
    entry("Triceps Pushdown (Bar)", "Triceps"),
    entry("Triceps Pushdown (Rope)", "Triceps"),
    entry("Skull Crusher", "Triceps"),
    entry("Triceps Kickback", "Triceps"),
];

/// Catalogue entries whose name contains `query` (case-insensitive),
/// optionally limited to one muscle group.
pub fn search_catalogue(query: &str, muscle_group: Option<&str>) -> Vec<CatalogueEntry> {
    let query = query.to_lowercase();
    EXERCISE_CATALOGUE
        .iter()
        .filter(|e| muscle_group.map_or(true, |g| e.muscle_group.eq_ignore_ascii_case(g)))
        .filter(|e| e.name.to_lowercase().contains(&query))
        .copied()
        .collect()
}

/// One exercise in a plan with its target volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub name: String,
    pub sets: u32,
    /// Target reps, either a count ("5") or a range ("8-12").
    pub reps: String,
}

impl PlannedExercise {
    pub fn new(name: &str, sets: u32, reps: &str) -> Self {
        Self {
            name: name.to_string(),
            sets,
            reps: reps.to_string(),
        }
    }

    /// Parse `EXERCISE` or `EXERCISE:SETSxREPS`, e.g. `Squat:5x5` or
    /// `Hammer Curl:2x8-12`. A bare name gets 3 sets of 8-12.
    pub fn parse_spec(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPlanEntry {
            input: input.to_string(),
        };
        let (name, sets, reps) = match input.rsplit_once(':') {
            None => (input.trim(), DEFAULT_PLAN_SETS, DEFAULT_PLAN_REPS),
            Some((name, target)) => {
                let (sets, reps) = target.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
                let sets: u32 = sets.trim().parse().map_err(|_| invalid())?;
                (name.trim(), sets, reps.trim())
            }
        };
        if name.is_empty() {
            return Err(invalid());
        }
        let exercise = Self::new(name, sets, reps);
        exercise.validate()?;
        Ok(exercise)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sets == 0 || self.sets > MAX_PLAN_SETS {
            return Err(ValidationError::InvalidValue {
                field: "sets".into(),
                message: format!("{} is outside 1..={MAX_PLAN_SETS}", self.sets),
            });
        }
        if !valid_reps(&self.reps) {
            return Err(ValidationError::InvalidValue {
                field: "reps".into(),
                message: format!("'{}' is neither a count nor a LOW-HIGH range", self.reps),
            });
        }
        Ok(())
    }
}

fn valid_reps(reps: &str) -> bool {
    let positive = |s: &str| s.trim().parse::<u32>().is_ok_and(|n| n > 0);
    match reps.split_once('-') {
        None => positive(reps),
        Some((low, high)) => match (low.trim().parse::<u32>(), high.trim().parse::<u32>()) {
            (Ok(low), Ok(high)) => low > 0 && low <= high,
            _ => false,
        },
    }
}

/// A named list of exercises to work through in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub name: String,
    pub exercises: Vec<PlannedExercise>,
    /// Shipped with the app; cannot be replaced or deleted.
    #[serde(default)]
    pub builtin: bool,
}

impl WorkoutPlan {
    /// Validate a user plan: a non-empty name of at most 30 characters,
    /// at least one exercise, no exercise listed twice.
    pub fn new(name: &str, exercises: Vec<PlannedExercise>) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_PLAN_NAME_CHARS {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: format!("plan names are 1 to {MAX_PLAN_NAME_CHARS} characters"),
            });
        }
        if exercises.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "exercises".into(),
                message: "a plan needs at least one exercise".into(),
            });
        }
        for (idx, exercise) in exercises.iter().enumerate() {
            exercise.validate()?;
            if exercises[..idx]
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(&exercise.name))
            {
                return Err(ValidationError::InvalidValue {
                    field: "exercises".into(),
                    message: format!("'{}' is listed twice", exercise.name),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            exercises,
            builtin: false,
        })
    }

    /// The plans that ship with the app.
    pub fn builtins() -> Vec<WorkoutPlan> {
        let plan = |name: &str, exercises: &[(&str, u32, &str)]| WorkoutPlan {
            name: name.to_string(),
            exercises: exercises
                .iter()
                .map(|(name, sets, reps)| PlannedExercise::new(name, *sets, reps))
                .collect(),
            builtin: true,
        };
        vec![
            plan(
                "Day A",
                &[
                    ("Squat", 5, "5"),
                    ("Deadlift", 1, "5"),
                    ("Close-Grip Pull-Up", 4, "6-8"),
                    ("Incline Bench Press", 4, "6-8"),
                    ("Barbell Row (Overhand)", 3, "8-12"),
                    ("Triceps Pushdown (Bar)", 3, "8-12"),
                    ("Hammer Curl", 2, "8-12"),
                ],
            ),
            plan(
                "Day B",
                &[
                    ("Squat", 5, "5"),
                    ("Bench Press", 5, "5"),
                    ("Barbell Row (Underhand)", 5, "5"),
                    ("Overhead Press (Barbell)", 3, "8-12"),
                    ("EZ-Bar Curl", 3, "8-12"),
                    ("Triceps Pushdown (Rope)", 2, "8-12"),
                ],
            ),
        ]
    }

    /// Built-in plan with this name, ignoring case.
    pub fn builtin(name: &str) -> Option<WorkoutPlan> {
        Self::builtins()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Rewrite exercise names to their spelling in `known`. Names that
    /// are in neither the catalogue nor the configured muscle groups are
    /// rejected.
    pub fn canonicalize(mut self, known: &MuscleGroupMap) -> Result<Self, ValidationError> {
        for exercise in &mut self.exercises {
            let canonical = known
                .canonical_name(&exercise.name)
                .ok_or_else(|| ValidationError::UnknownExercise {
                    name: exercise.name.clone(),
                })?;
            exercise.name = canonical.to_string();
        }
        Ok(self)
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

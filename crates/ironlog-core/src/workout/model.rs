use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One logged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// Exercise display name. Sets logged without an exercise count toward
    /// total volume only.
    pub exercise_key: Option<String>,
    /// Kilograms.
    pub weight: f64,
    pub reps: u32,
    /// Position within the session, starting at 1.
    pub order: u32,
    #[serde(default)]
    pub is_warmup: bool,
}

impl SetRecord {
    pub fn working(exercise: &str, weight: f64, reps: u32) -> Self {
        Self {
            exercise_key: Some(exercise.to_string()),
            weight,
            reps,
            order: 0,
            is_warmup: false,
        }
    }

    pub fn warmup(exercise: &str, weight: f64, reps: u32) -> Self {
        Self {
            is_warmup: true,
            ..Self::working(exercise, weight, reps)
        }
    }

    /// `weight × reps`; defined for warm-up sets too.
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }

    /// A set with neither weight nor reps carries no information.
    pub fn is_empty(&self) -> bool {
        self.weight == 0.0 && self.reps == 0
    }

    /// Parse `EXERCISE:WEIGHTxREPS`, e.g. `Bench Press:100x5` or
    /// `Squat:102.5X3`.
    pub fn parse_spec(input: &str, is_warmup: bool) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidSetSpec {
            input: input.to_string(),
        };
        let (exercise, load) = input.rsplit_once(':').ok_or_else(invalid)?;
        let exercise = exercise.trim();
        if exercise.is_empty() {
            return Err(invalid());
        }
        let (weight, reps) = load
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(invalid)?;
        let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
        let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
        let set = Self {
            exercise_key: Some(exercise.to_string()),
            weight,
            reps,
            order: 0,
            is_warmup,
        };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "weight".into(),
                message: format!("{} is not a non-negative number of kilograms", self.weight),
            });
        }
        Ok(())
    }
}

/// A session as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub date: NaiveDate,
    pub sets: Vec<SetRecord>,
}

impl WorkoutSession {
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(SetRecord::volume).sum()
    }
}

/// A session about to be written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub date: NaiveDate,
    pub sets: Vec<SetRecord>,
}

impl NewSession {
    /// Build a session, dropping empty sets and numbering the rest in
    /// their given order.
    pub fn new(date: NaiveDate, sets: Vec<SetRecord>) -> Result<Self, ValidationError> {
        let mut kept = Vec::with_capacity(sets.len());
        for set in sets.into_iter().filter(|s| !s.is_empty()) {
            set.validate()?;
            kept.push(set);
        }
        for (idx, set) in kept.iter_mut().enumerate() {
            set.order = idx as u32 + 1;
        }
        Ok(Self { date, sets: kept })
    }
}

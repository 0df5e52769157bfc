//! Estimated one-rep max using the Epley formula.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::workout::SetRecord;

/// `weight × (1 + reps / 30)`, rounded to the nearest kilogram. A single
/// rep is its own max. Sets with no weight or no reps have no estimate.
pub fn epley(weight: f64, reps: u32) -> Option<f64> {
    if weight <= 0.0 || reps == 0 {
        return None;
    }
    if reps == 1 {
        return Some(weight);
    }
    Some((weight * (1.0 + f64::from(reps) / 30.0)).round())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRepMax {
    pub exercise_key: String,
    pub estimate: f64,
    /// The set the estimate came from.
    pub weight: f64,
    pub reps: u32,
}

/// Best estimate per exercise across `sets`, in first-appearance order.
pub fn best_estimates<'a, I>(sets: I) -> Vec<OneRepMax>
where
    I: IntoIterator<Item = &'a SetRecord>,
{
    let mut best: IndexMap<&str, OneRepMax> = IndexMap::new();
    for set in sets {
        let (Some(exercise), Some(estimate)) = (set.exercise_key.as_deref(), epley(set.weight, set.reps))
        else {
            continue;
        };
        let candidate = OneRepMax {
            exercise_key: exercise.to_string(),
            estimate,
            weight: set.weight,
            reps: set.reps,
        };
        match best.get_mut(exercise) {
            Some(current) if current.estimate >= estimate => {}
            Some(current) => *current = candidate,
            None => {
                best.insert(exercise, candidate);
            }
        }
    }
    best.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epley_estimates() {
        assert_eq!(epley(100.0, 1), Some(100.0));
        assert_eq!(epley(100.0, 5), Some(117.0));
        assert_eq!(epley(60.0, 10), Some(80.0));
        assert_eq!(epley(0.0, 5), None);
        assert_eq!(epley(100.0, 0), None);
    }

    #[test]
    fn keeps_the_best_set_per_exercise() {
        let sets = vec![
            SetRecord::working("Squat", 100.0, 5),
            SetRecord::working("Bench Press", 80.0, 3),
            SetRecord::working("Squat", 110.0, 1),
            SetRecord::working("Squat", 90.0, 10),
        ];
        let best = best_estimates(&sets);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].exercise_key, "Squat");
        assert_eq!(best[0].estimate, 120.0);
        assert_eq!((best[0].weight, best[0].reps), (90.0, 10));
        assert_eq!(best[1].estimate, 88.0);
    }
}

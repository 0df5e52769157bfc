use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::plan::EXERCISE_CATALOGUE;

/// Label for exercises missing from the map.
pub const OTHER_GROUP: &str = "Other";

/// Static exercise → muscle-group mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MuscleGroupMap {
    groups: IndexMap<String, String>,
}

impl MuscleGroupMap {
    /// Mapping for the built-in exercise catalogue.
    pub fn builtin() -> Self {
        EXERCISE_CATALOGUE
            .iter()
            .map(|e| (e.name, e.muscle_group))
            .collect()
    }

    /// Built-in catalogue with `overrides` layered on top.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (exercise, group) in overrides {
            self.groups.insert(exercise.clone(), group.clone());
        }
        self
    }

    /// Muscle group for `exercise`, or [`OTHER_GROUP`].
    pub fn group_for(&self, exercise: &str) -> &str {
        self.groups
            .get(exercise)
            .map(String::as_str)
            .unwrap_or(OTHER_GROUP)
    }

    /// The mapped spelling of `exercise`, matched case-insensitively.
    pub fn canonical_name(&self, exercise: &str) -> Option<&str> {
        let exercise = exercise.trim();
        self.groups
            .keys()
            .find(|k| k.eq_ignore_ascii_case(exercise))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for MuscleGroupMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MuscleGroupMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unmapped_exercises_fall_into_other() {
        let map = MuscleGroupMap::builtin();
        assert_eq!(map.group_for("Squat"), "Legs");
        assert_eq!(map.group_for("Cable Fly"), OTHER_GROUP);
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Deadlift".to_string(), "Legs".to_string());
        overrides.insert("Cable Fly".to_string(), "Chest".to_string());
        let map = MuscleGroupMap::builtin().with_overrides(&overrides);
        assert_eq!(map.group_for("Deadlift"), "Legs");
        assert_eq!(map.group_for("Cable Fly"), "Chest");
        assert_eq!(map.len(), MuscleGroupMap::builtin().len() + 1);
        assert_eq!(map.canonical_name("cable fly"), Some("Cable Fly"));
    }

    #[test]
    fn builtin_map_covers_catalogue() {
        let map = MuscleGroupMap::builtin();
        assert_eq!(map.len(), EXERCISE_CATALOGUE.len());
        assert_eq!(map.group_for("Leg Press"), "Legs");
        assert_eq!(map.group_for("Face Pull"), "Shoulders");
        assert_eq!(map.canonical_name(" ez-bar curl "), Some("EZ-Bar Curl"));
        assert_eq!(map.canonical_name("Curl"), None);
    }
}

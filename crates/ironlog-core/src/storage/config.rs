//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Interval timer durations and their sanity bounds
//! - Audio cue pitches and volumes
//! - Week numbering used for streaks
//! - Muscle-group overrides for custom exercises
//!
//! Configuration is stored at `~/.config/ironlog/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::stats::WeekScheme;
use crate::timer::{Cue, CuePalette, DEFAULT_REST_SECS, DEFAULT_WORK_SECS};
use crate::workout::MuscleGroupMap;

/// Interval timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_rest_duration")]
    pub rest_duration: u32,
    /// Smallest duration accepted from config or the command line.
    #[serde(default = "default_min_duration")]
    pub min_duration: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,
}

/// Audio cue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_work_end_hz")]
    pub work_end_hz: f32,
    #[serde(default = "default_rest_end_hz")]
    pub rest_end_hz: f32,
    #[serde(default = "default_countdown_hz")]
    pub countdown_hz: f32,
    #[serde(default = "default_transition_volume")]
    pub transition_volume: f32,
    #[serde(default = "default_countdown_volume")]
    pub countdown_volume: f32,
}

/// Analytics configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default)]
    pub week_scheme: WeekScheme,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ironlog/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub cues: CuesConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    /// Exercise → muscle group, layered over the built-in map.
    #[serde(default)]
    pub muscle_groups: BTreeMap<String, String>,
}

// Default functions
fn default_work_duration() -> u32 {
    DEFAULT_WORK_SECS
}
fn default_rest_duration() -> u32 {
    DEFAULT_REST_SECS
}
fn default_min_duration() -> u32 {
    10
}
fn default_max_duration() -> u32 {
    300
}
fn default_true() -> bool {
    true
}
fn default_work_end_hz() -> f32 {
    880.0
}
fn default_rest_end_hz() -> f32 {
    660.0
}
fn default_countdown_hz() -> f32 {
    440.0
}
fn default_transition_volume() -> f32 {
    0.3
}
fn default_countdown_volume() -> f32 {
    0.1
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            rest_duration: default_rest_duration(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
        }
    }
}

impl TimerConfig {
    /// Check `secs` against the configured bounds.
    pub fn check_duration(&self, key: &str, secs: u32) -> Result<(), ConfigError> {
        if secs < self.min_duration || secs > self.max_duration {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "{secs} s is outside {}..={} s",
                    self.min_duration, self.max_duration
                ),
            });
        }
        Ok(())
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            work_end_hz: default_work_end_hz(),
            rest_end_hz: default_rest_end_hz(),
            countdown_hz: default_countdown_hz(),
            transition_volume: default_transition_volume(),
            countdown_volume: default_countdown_volume(),
        }
    }
}

impl CuesConfig {
    pub fn palette(&self) -> CuePalette {
        let defaults = CuePalette::default();
        CuePalette {
            countdown: Cue::new(
                self.countdown_hz,
                defaults.countdown.duration_secs,
                self.countdown_volume,
            ),
            work_end: Cue::new(
                self.work_end_hz,
                defaults.work_end.duration_secs,
                self.transition_volume,
            ),
            rest_end: Cue::new(
                self.rest_end_hz,
                defaults.rest_end.duration_secs,
                self.transition_volume,
            ),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(unknown());
        }

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;

        let new_value = match obj.get(leaf) {
            Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            Some(serde_json::Value::Number(_)) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                }
            }
            Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            Some(_) => serde_json::Value::String(value.into()),
            // Muscle-group overrides are the one open-ended table.
            None if parent_path == Some("muscle_groups") => serde_json::Value::String(value.into()),
            None => return Err(unknown()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/ironlog"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the rest of the application cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timer = &self.timer;
        if timer.min_duration == 0 || timer.min_duration > timer.max_duration {
            return Err(ConfigError::InvalidValue {
                key: "timer.min_duration".into(),
                message: format!(
                    "bounds {}..={} are empty or include zero",
                    timer.min_duration, timer.max_duration
                ),
            });
        }
        timer.check_duration("timer.work_duration", timer.work_duration)?;
        timer.check_duration("timer.rest_duration", timer.rest_duration)?;

        for (key, volume) in [
            ("cues.transition_volume", self.cues.transition_volume),
            ("cues.countdown_volume", self.cues.countdown_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("{volume} is outside 0.0..=1.0"),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// The change is applied only if the resulting config still validates.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Built-in muscle-group map with the configured overrides applied.
    pub fn muscle_group_map(&self) -> MuscleGroupMap {
        MuscleGroupMap::builtin().with_overrides(&self.muscle_groups)
    }
}

//! Core error types for ironlog-core.
//!
//! This module defines the error hierarchy using thiserror. Timer
//! transitions, storage access and configuration each get their own enum,
//! and `CoreError` wraps all of them for callers that don't care which
//! layer failed.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::timer::Phase;

/// Core error type for ironlog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer state machine errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Workout store / database errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the interval timer.
///
/// Every variant leaves the engine state exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Work or rest duration of zero seconds.
    #[error("Invalid duration: {0} seconds (must be positive)")]
    InvalidDuration(u32),

    /// Command not allowed in the current phase.
    #[error("Cannot {action} while timer is {from}")]
    InvalidTransition { from: Phase, action: &'static str },
}

/// Workout store and key-value persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: &'static str, message: String },

    /// A row with this key already exists
    #[error("'{key}' already exists in '{table}'")]
    Duplicate { table: &'static str, key: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for user-supplied workout data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Unparsable set specification
    #[error("Invalid set '{input}': expected EXERCISE:WEIGHTxREPS")]
    InvalidSetSpec { input: String },

    /// Unparsable plan entry
    #[error("Invalid plan entry '{input}': expected EXERCISE or EXERCISE:SETSxREPS")]
    InvalidPlanEntry { input: String },

    /// Exercise missing from the catalogue and the configured muscle groups
    #[error("Unknown exercise '{name}' (see `workout plan catalogue`, or map it under [muscle_groups])")]
    UnknownExercise { name: String },

    /// Date range whose start lies after its end
    #[error("Invalid date range: {start} is after {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Persisted timer state and the key-value boundary it is written to.
//!
//! A snapshot is a flat record. Its JSON form uses the camelCase keys
//! `phase`, `timeLeftSeconds`, `currentSet`, `workDurationSeconds`,
//! `restDurationSeconds` and `savedAtEpochMillis`; anything that does not
//! decode into that shape is treated as if no snapshot existed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Key under which the running interval timer is persisted.
pub const SNAPSHOT_KEY: &str = "interval_timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Idle,
    Work,
    Rest,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Work => "WORK",
            Phase::Rest => "REST",
        }
    }

    /// WORK and REST are the phases in which the countdown runs.
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of an in-progress interval timer at the moment it was saved.
///
/// Never persisted with `phase = IDLE`: an absent snapshot is the idle
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub time_left_seconds: u32,
    pub current_set: u32,
    pub work_duration_seconds: u32,
    pub rest_duration_seconds: u32,
    pub saved_at_epoch_millis: i64,
}

impl TimerSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored value. Malformed input yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<TimerSnapshot>(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparsable timer snapshot");
                None
            }
        }
    }

    /// Whether this snapshot describes a timer that can be resumed.
    pub fn is_resumable(&self) -> bool {
        self.phase.is_active() && self.work_duration_seconds > 0 && self.rest_duration_seconds > 0
    }
}

/// Key-value persistence target for timer snapshots.
///
/// Implementations decode on read; a value that fails to decode reads as
/// absent. Reads never fail, writes and deletes report failure.
pub trait SnapshotStore: Send {
    fn get(&self, key: &str) -> Option<TimerSnapshot>;

    /// Whether any value, decodable or not, is stored under `key`.
    fn contains_key(&self, key: &str) -> Result<bool, StoreError>;

    fn set(&mut self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StoreError>;

    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store holding raw strings.
///
/// Clones share the same entries, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value verbatim, bypassing encoding.
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.lock().insert(key.to_string(), raw.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Make every subsequent `set`/`delete` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed("memory store is read-only".into()));
        }
        Ok(())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Option<TimerSnapshot> {
        let raw = self.lock().get(key).cloned()?;
        TimerSnapshot::from_json(&raw)
    }

    fn contains_key(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock().contains_key(key))
    }

    fn set(&mut self, key: &str, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        self.check_writable()?;
        let raw = snapshot.to_json().map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.lock().insert(key.to_string(), raw);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}

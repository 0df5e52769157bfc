use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every timer state change produces an Event.
/// The CLI prints them as JSON lines; other front-ends can poll for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        work_duration_secs: u32,
        rest_duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second elapsed without anything else worth reporting.
    Tick {
        phase: Phase,
        time_left_secs: u32,
        current_set: u32,
        at: DateTime<Utc>,
    },
    /// One of the last five seconds of a phase.
    Countdown {
        phase: Phase,
        time_left_secs: u32,
        current_set: u32,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        time_left_secs: u32,
        current_set: u32,
        at: DateTime<Utc>,
    },
    TimerStopped {
        /// Set that was in progress when the timer was stopped.
        last_set: u32,
        at: DateTime<Utc>,
    },
    /// Engine resumed a persisted run after a restart.
    TimerRecovered {
        phase: Phase,
        time_left_secs: u32,
        current_set: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        time_left_secs: u32,
        current_set: u32,
        work_duration_secs: u32,
        rest_duration_secs: u32,
        phase_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event marks a phase boundary or lifecycle change.
    pub fn is_transition(&self) -> bool {
        !matches!(
            self,
            Event::Tick { .. } | Event::Countdown { .. } | Event::StateSnapshot { .. }
        )
    }
}

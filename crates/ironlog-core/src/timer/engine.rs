//! Interval timer engine.
//!
//! The engine is a one-second-granularity state machine. It does not own a
//! thread: `tick()` is driven by a [`TickLoop`](super::TickLoop) (or by a
//! test calling it directly), and every tick persists a snapshot so the run
//! survives a process restart.
//!
//! ## State Transitions
//!
//! ```text
//! IDLE --start--> WORK --0s--> REST --0s--> WORK (set + 1) ...
//!   ^                |                |
//!   +------stop------+-------stop-----+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Box::new(store), Box::new(SilentCueSink), Arc::new(SystemClock));
//! engine.start()?;
//! // once per second:
//! engine.tick();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::clock::Clock;
use super::cue::{play_isolated, AudioCueSink, CuePalette};
use super::presets::Preset;
use super::recovery::RecoveryResolver;
use super::snapshot::{Phase, SnapshotStore, TimerSnapshot, SNAPSHOT_KEY};
use crate::error::TimerError;
use crate::events::Event;

pub const DEFAULT_WORK_SECS: u32 = 90;
pub const DEFAULT_REST_SECS: u32 = 120;

/// Countdown cues play while `1 <= time_left <= COUNTDOWN_SECS`.
const COUNTDOWN_SECS: u32 = 5;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub phase: Phase,
    pub time_left_secs: u32,
    pub current_set: u32,
    pub work_duration_secs: u32,
    pub rest_duration_secs: u32,
}

impl TimerStatus {
    pub fn idle(work_duration_secs: u32, rest_duration_secs: u32) -> Self {
        Self {
            phase: Phase::Idle,
            time_left_secs: 0,
            current_set: 0,
            work_duration_secs,
            rest_duration_secs,
        }
    }

    pub fn from_snapshot(snapshot: &TimerSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            time_left_secs: snapshot.time_left_seconds,
            current_set: snapshot.current_set,
            work_duration_secs: snapshot.work_duration_seconds,
            rest_duration_secs: snapshot.rest_duration_seconds,
        }
    }

    pub fn to_snapshot(&self, saved_at_epoch_millis: i64) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            time_left_seconds: self.time_left_secs,
            current_set: self.current_set,
            work_duration_seconds: self.work_duration_secs,
            rest_duration_seconds: self.rest_duration_secs,
            saved_at_epoch_millis,
        }
    }

    /// Length of the phase currently counting down.
    pub fn phase_duration_secs(&self) -> u32 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Work => self.work_duration_secs,
            Phase::Rest => self.rest_duration_secs,
        }
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase_duration_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.time_left_secs) / f64::from(total))
    }

    /// Advance by `elapsed_secs` whole seconds, exactly as if ticked that
    /// many times. Returns the phase that ended first, if any ended.
    ///
    /// Whole WORK+REST cycles are skipped arithmetically, so the cost does
    /// not depend on the size of the gap.
    pub(crate) fn fast_forward(&mut self, elapsed_secs: u64) -> Option<Phase> {
        if !self.phase.is_active() {
            return None;
        }
        let work = i64::from(self.work_duration_secs.max(1));
        let rest = i64::from(self.rest_duration_secs.max(1));
        let elapsed = i64::try_from(elapsed_secs).unwrap_or(i64::MAX);
        let mut left = i64::from(self.time_left_secs) - elapsed;
        if left > 0 {
            self.time_left_secs = left as u32;
            return None;
        }

        let first_ended = self.phase;
        self.switch_phase(&mut left, work, rest);

        let cycle = work + rest;
        if -left >= cycle {
            // Each full cycle passes exactly one REST -> WORK boundary.
            let cycles = -left / cycle;
            left += cycles * cycle;
            let cycles = u32::try_from(cycles).unwrap_or(u32::MAX);
            self.current_set = self.current_set.saturating_add(cycles);
        }
        while left <= 0 {
            self.switch_phase(&mut left, work, rest);
        }

        self.time_left_secs = u32::try_from(left).unwrap_or(u32::MAX);
        Some(first_ended)
    }

    fn switch_phase(&mut self, left: &mut i64, work: i64, rest: i64) {
        match self.phase {
            Phase::Work => {
                self.phase = Phase::Rest;
                *left += rest;
            }
            Phase::Rest | Phase::Idle => {
                self.phase = Phase::Work;
                self.current_set = self.current_set.saturating_add(1);
                *left += work;
            }
        }
    }
}

/// Interval timer with injected persistence, audio and clock.
pub struct TimerEngine {
    status: TimerStatus,
    store: Box<dyn SnapshotStore>,
    cues: Box<dyn AudioCueSink>,
    palette: CuePalette,
    cues_enabled: bool,
    clock: Arc<dyn Clock>,
    /// Bumped on every start/stop so a stale tick loop can tell it has
    /// been superseded.
    generation: u64,
    recovered_elapsed_secs: Option<u64>,
    /// The store is known to hold this run's snapshot.
    persisted: bool,
}

impl TimerEngine {
    /// Create an engine, resuming any run persisted in `store`.
    ///
    /// Recovery happens here, before any tick can be scheduled.
    pub fn new(
        store: Box<dyn SnapshotStore>,
        cues: Box<dyn AudioCueSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let snapshot = store.get(SNAPSHOT_KEY);
        let recovery = RecoveryResolver::resolve(snapshot.as_ref(), clock.now_ms());
        let recovered_elapsed_secs = if recovery.status.phase.is_active() {
            tracing::info!(
                phase = %recovery.status.phase,
                time_left_secs = recovery.status.time_left_secs,
                current_set = recovery.status.current_set,
                elapsed_secs = recovery.elapsed_secs,
                "resumed interval timer from snapshot"
            );
            Some(recovery.elapsed_secs)
        } else {
            None
        };
        Self {
            status: recovery.status,
            store,
            cues,
            palette: CuePalette::default(),
            cues_enabled: true,
            clock,
            generation: 0,
            persisted: recovered_elapsed_secs.is_some(),
            recovered_elapsed_secs,
        }
    }

    pub fn with_palette(mut self, palette: CuePalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_cues_enabled(mut self, enabled: bool) -> Self {
        self.cues_enabled = enabled;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.status.phase
    }

    pub fn time_left_secs(&self) -> u32 {
        self.status.time_left_secs
    }

    pub fn current_set(&self) -> u32 {
        self.status.current_set
    }

    pub fn work_duration_secs(&self) -> u32 {
        self.status.work_duration_secs
    }

    pub fn rest_duration_secs(&self) -> u32 {
        self.status.rest_duration_secs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `TimerRecovered` if construction resumed a persisted run.
    pub fn recovery_event(&self) -> Option<Event> {
        let elapsed_secs = self.recovered_elapsed_secs?;
        Some(Event::TimerRecovered {
            phase: self.status.phase,
            time_left_secs: self.status.time_left_secs,
            current_set: self.status.current_set,
            elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.status.phase,
            time_left_secs: self.status.time_left_secs,
            current_set: self.status.current_set,
            work_duration_secs: self.status.work_duration_secs,
            rest_duration_secs: self.status.rest_duration_secs,
            phase_progress_pct: self.status.phase_progress() * 100.0,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Event, TimerError> {
        self.require_phase(Phase::Idle, "start")?;
        self.status.phase = Phase::Work;
        self.status.time_left_secs = self.status.work_duration_secs;
        self.status.current_set = 1;
        self.generation += 1;
        self.recovered_elapsed_secs = None;
        self.persist();
        tracing::info!(
            work_secs = self.status.work_duration_secs,
            rest_secs = self.status.rest_duration_secs,
            "interval timer started"
        );
        Ok(Event::TimerStarted {
            work_duration_secs: self.status.work_duration_secs,
            rest_duration_secs: self.status.rest_duration_secs,
            at: Utc::now(),
        })
    }

    /// Return to IDLE. The persisted snapshot is gone when this returns.
    pub fn stop(&mut self) -> Result<Event, TimerError> {
        if !self.status.phase.is_active() {
            return Err(TimerError::InvalidTransition {
                from: self.status.phase,
                action: "stop",
            });
        }
        let last_set = self.reset_to_idle();
        if let Err(e) = self.store.delete(SNAPSHOT_KEY) {
            tracing::warn!(error = %e, "failed to delete timer snapshot");
        }
        tracing::info!(last_set, "interval timer stopped");
        Ok(Event::TimerStopped {
            last_set,
            at: Utc::now(),
        })
    }

    /// Advance one second. No-op while IDLE.
    ///
    /// A run whose snapshot was removed from the store since the last
    /// write (another process ran `stop`) ends here with `TimerStopped`
    /// instead of being written back.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.status.phase.is_active() {
            return None;
        }
        if self.persisted && matches!(self.store.contains_key(SNAPSHOT_KEY), Ok(false)) {
            let last_set = self.reset_to_idle();
            tracing::info!(last_set, "interval timer stopped elsewhere");
            return Some(Event::TimerStopped {
                last_set,
                at: Utc::now(),
            });
        }
        let ended = self.status.fast_forward(1);
        let now = Utc::now();
        let event = match ended {
            Some(from) => {
                let cue = match from {
                    Phase::Work => self.palette.work_end,
                    _ => self.palette.rest_end,
                };
                self.emit(cue);
                tracing::info!(
                    from = %from,
                    to = %self.status.phase,
                    current_set = self.status.current_set,
                    "phase changed"
                );
                Event::PhaseChanged {
                    from,
                    to: self.status.phase,
                    time_left_secs: self.status.time_left_secs,
                    current_set: self.status.current_set,
                    at: now,
                }
            }
            None if (1..=COUNTDOWN_SECS).contains(&self.status.time_left_secs) => {
                self.emit(self.palette.countdown);
                Event::Countdown {
                    phase: self.status.phase,
                    time_left_secs: self.status.time_left_secs,
                    current_set: self.status.current_set,
                    at: now,
                }
            }
            None => Event::Tick {
                phase: self.status.phase,
                time_left_secs: self.status.time_left_secs,
                current_set: self.status.current_set,
                at: now,
            },
        };
        self.persist();
        Some(event)
    }

    pub fn set_work_duration(&mut self, secs: u32) -> Result<(), TimerError> {
        self.require_phase(Phase::Idle, "change work duration")?;
        if secs == 0 {
            return Err(TimerError::InvalidDuration(secs));
        }
        self.status.work_duration_secs = secs;
        Ok(())
    }

    pub fn set_rest_duration(&mut self, secs: u32) -> Result<(), TimerError> {
        self.require_phase(Phase::Idle, "change rest duration")?;
        if secs == 0 {
            return Err(TimerError::InvalidDuration(secs));
        }
        self.status.rest_duration_secs = secs;
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), TimerError> {
        self.require_phase(Phase::Idle, "apply preset")?;
        self.status.work_duration_secs = preset.work_secs();
        self.status.rest_duration_secs = preset.rest_secs();
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require_phase(&self, expected: Phase, action: &'static str) -> Result<(), TimerError> {
        if self.status.phase != expected {
            return Err(TimerError::InvalidTransition {
                from: self.status.phase,
                action,
            });
        }
        Ok(())
    }

    fn emit(&self, cue: super::cue::Cue) {
        if self.cues_enabled {
            play_isolated(self.cues.as_ref(), cue);
        }
    }

    /// Drop to IDLE and invalidate the current run. Returns the set that
    /// was in progress.
    fn reset_to_idle(&mut self) -> u32 {
        let last_set = self.status.current_set;
        self.status.phase = Phase::Idle;
        self.status.time_left_secs = 0;
        self.status.current_set = 0;
        self.generation += 1;
        self.recovered_elapsed_secs = None;
        self.persisted = false;
        last_set
    }

    fn persist(&mut self) {
        let snapshot = self.status.to_snapshot(self.clock.now_ms());
        match self.store.set(SNAPSHOT_KEY, &snapshot) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                self.persisted = false;
                tracing::warn!(error = %e, "failed to persist timer snapshot");
            }
        }
    }
}

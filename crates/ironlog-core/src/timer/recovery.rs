//! Rebuilds live timer state from a persisted snapshot.

use super::engine::{TimerStatus, DEFAULT_REST_SECS, DEFAULT_WORK_SECS};
use super::snapshot::TimerSnapshot;

/// Outcome of resolving a snapshot against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub status: TimerStatus,
    /// Whole seconds between the save and `now` (0 when idle).
    pub elapsed_secs: u64,
}

/// Fast-forwards a stale snapshot to `now`.
///
/// The result is the state the engine would be in had it ticked once per
/// second since the snapshot was saved. Missing, idle or nonsensical
/// snapshots resolve to IDLE; this never fails.
pub struct RecoveryResolver;

impl RecoveryResolver {
    pub fn resolve(snapshot: Option<&TimerSnapshot>, now_ms: i64) -> Recovery {
        let Some(snapshot) = snapshot else {
            return Self::idle(None);
        };
        if !snapshot.is_resumable() {
            if snapshot.phase.is_active() {
                tracing::warn!(?snapshot, "ignoring timer snapshot with zero duration");
            }
            return Self::idle(Some(snapshot));
        }

        let elapsed_secs = Self::elapsed_secs(snapshot.saved_at_epoch_millis, now_ms);
        let mut status = TimerStatus::from_snapshot(snapshot);
        status.fast_forward(elapsed_secs);
        Recovery {
            status,
            elapsed_secs,
        }
    }

    /// `floor((now - saved_at) / 1000)`, clamped at zero when the clock
    /// went backwards.
    pub fn elapsed_secs(saved_at_ms: i64, now_ms: i64) -> u64 {
        let delta = now_ms.saturating_sub(saved_at_ms);
        if delta <= 0 {
            0
        } else {
            (delta / 1000) as u64
        }
    }

    fn idle(snapshot: Option<&TimerSnapshot>) -> Recovery {
        let (work, rest) = snapshot
            .filter(|s| s.work_duration_seconds > 0 && s.rest_duration_seconds > 0)
            .map(|s| (s.work_duration_seconds, s.rest_duration_seconds))
            .unwrap_or((DEFAULT_WORK_SECS, DEFAULT_REST_SECS));
        Recovery {
            status: TimerStatus::idle(work, rest),
            elapsed_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{
        ManualClock, MemorySnapshotStore, Phase, SilentCueSink, SnapshotStore, TimerEngine,
        SNAPSHOT_KEY,
    };
    use proptest::prelude::*;
    use std::sync::Arc;

    const SAVED_AT: i64 = 1_760_000_000_000;

    fn snapshot(phase: Phase, left: u32, set: u32, work: u32, rest: u32) -> TimerSnapshot {
        TimerSnapshot {
            phase,
            time_left_seconds: left,
            current_set: set,
            work_duration_seconds: work,
            rest_duration_seconds: rest,
            saved_at_epoch_millis: SAVED_AT,
        }
    }

    fn at(elapsed_secs: i64) -> i64 {
        SAVED_AT + elapsed_secs * 1000
    }

    #[test]
    fn fast_forwards_through_two_phases() {
        let snap = snapshot(Phase::Work, 10, 3, 90, 120);
        let recovery = RecoveryResolver::resolve(Some(&snap), at(200));
        assert_eq!(recovery.status.phase, Phase::Work);
        assert_eq!(recovery.status.time_left_secs, 20);
        assert_eq!(recovery.status.current_set, 4);
        assert_eq!(recovery.elapsed_secs, 200);
    }

    #[test]
    fn partial_seconds_are_floored() {
        let snap = snapshot(Phase::Rest, 30, 2, 60, 60);
        let recovery = RecoveryResolver::resolve(Some(&snap), SAVED_AT + 4_999);
        assert_eq!(recovery.status.time_left_secs, 26);
        assert_eq!(recovery.status.phase, Phase::Rest);
    }

    #[test]
    fn landing_exactly_on_zero_switches_phase() {
        let snap = snapshot(Phase::Rest, 30, 2, 60, 45);
        let recovery = RecoveryResolver::resolve(Some(&snap), at(30));
        assert_eq!(recovery.status.phase, Phase::Work);
        assert_eq!(recovery.status.current_set, 3);
        assert_eq!(recovery.status.time_left_secs, 60);
    }

    #[test]
    fn clock_going_backwards_changes_nothing() {
        let snap = snapshot(Phase::Work, 10, 1, 90, 120);
        let recovery = RecoveryResolver::resolve(Some(&snap), at(-3600));
        assert_eq!(recovery.status, TimerStatus::from_snapshot(&snap));
        assert_eq!(recovery.elapsed_secs, 0);
    }

    #[test]
    fn day_long_gap_resolves_by_cycles() {
        // 86_400 s with a 210 s cycle: first the 10 s of WORK, then
        // 411 full cycles (86_310 s), then 80 s into the final REST.
        let snap = snapshot(Phase::Work, 10, 1, 90, 120);
        let recovery = RecoveryResolver::resolve(Some(&snap), at(86_400));
        assert_eq!(recovery.status.phase, Phase::Rest);
        assert_eq!(recovery.status.current_set, 412);
        assert_eq!(recovery.status.time_left_secs, 40);
    }

    #[test]
    fn missing_or_idle_snapshot_resolves_idle() {
        let none = RecoveryResolver::resolve(None, at(5));
        assert_eq!(none.status.phase, Phase::Idle);
        assert_eq!(none.status.time_left_secs, 0);
        assert_eq!(none.status.current_set, 0);

        let idle = snapshot(Phase::Idle, 40, 7, 60, 30);
        let recovery = RecoveryResolver::resolve(Some(&idle), at(5));
        assert_eq!(recovery.status, TimerStatus::idle(60, 30));
    }

    #[test]
    fn zero_duration_snapshot_resolves_idle() {
        let broken = snapshot(Phase::Work, 10, 1, 0, 0);
        let recovery = RecoveryResolver::resolve(Some(&broken), at(500));
        assert_eq!(
            recovery.status,
            TimerStatus::idle(DEFAULT_WORK_SECS, DEFAULT_REST_SECS)
        );
    }

    #[test]
    fn exhausted_phase_switches_immediately() {
        let work = snapshot(Phase::Work, 0, 2, 60, 45);
        let recovery = RecoveryResolver::resolve(Some(&work), at(0));
        assert_eq!(recovery.status.phase, Phase::Rest);
        assert_eq!(recovery.status.current_set, 2);
        assert_eq!(recovery.status.time_left_secs, 45);

        let rest = snapshot(Phase::Rest, 0, 2, 60, 45);
        let recovery = RecoveryResolver::resolve(Some(&rest), at(10));
        assert_eq!(recovery.status.phase, Phase::Work);
        assert_eq!(recovery.status.current_set, 3);
        assert_eq!(recovery.status.time_left_secs, 50);
    }

    #[test]
    fn time_left_above_phase_length_counts_down_from_stored_value() {
        let snap = snapshot(Phase::Work, 100, 1, 60, 45);
        let recovery = RecoveryResolver::resolve(Some(&snap), at(30));
        assert_eq!(recovery.status.phase, Phase::Work);
        assert_eq!(recovery.status.time_left_secs, 70);

        // 100 s of WORK, then 45 s of REST, then 5 s into set 2.
        let recovery = RecoveryResolver::resolve(Some(&snap), at(150));
        assert_eq!(recovery.status.phase, Phase::Work);
        assert_eq!(recovery.status.current_set, 2);
        assert_eq!(recovery.status.time_left_secs, 55);
    }

    fn active_snapshot() -> impl Strategy<Value = TimerSnapshot> {
        (
            prop_oneof![Just(Phase::Work), Just(Phase::Rest)],
            1u32..400,
            1u32..400,
            0u32..450,
            0u32..50,
        )
            .prop_map(|(phase, work, rest, left, set)| {
                // 0 and values above the phase length are valid stored states.
                let cap = if phase == Phase::Work { work } else { rest };
                snapshot(phase, left % (cap + 51), set, work, rest)
            })
    }

    proptest! {
        #[test]
        fn recovery_matches_ticking_every_second(snap in active_snapshot(), elapsed in 0u64..2_000) {
            let mut store = MemorySnapshotStore::new();
            store.set(SNAPSHOT_KEY, &snap).unwrap();
            let mut engine = TimerEngine::new(
                Box::new(store),
                Box::new(SilentCueSink),
                Arc::new(ManualClock::new(SAVED_AT)),
            );
            if snap.time_left_seconds > 0 {
                prop_assert_eq!(engine.status(), TimerStatus::from_snapshot(&snap));
            }
            for _ in 0..elapsed {
                engine.tick();
            }
            let recovered = RecoveryResolver::resolve(Some(&snap), at(elapsed as i64));
            prop_assert_eq!(recovered.status, engine.status());
        }

        #[test]
        fn recovered_run_is_always_active_with_time_left(snap in active_snapshot(), elapsed in 0u64..10_000_000) {
            let recovered = RecoveryResolver::resolve(Some(&snap), at(elapsed as i64));
            prop_assert!(recovered.status.phase.is_active());
            prop_assert!(recovered.status.time_left_secs >= 1);
            let in_first_phase = recovered.status.phase == snap.phase
                && recovered.status.current_set == snap.current_set;
            let bound = if in_first_phase {
                recovered.status.phase_duration_secs().max(snap.time_left_seconds)
            } else {
                recovered.status.phase_duration_secs()
            };
            prop_assert!(recovered.status.time_left_secs <= bound);
        }
    }
}

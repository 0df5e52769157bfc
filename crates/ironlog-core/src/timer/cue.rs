//! Audible cues emitted by the interval timer.
//!
//! Sinks are fire-and-forget: `play` has no error channel, and the engine
//! additionally contains panics raised by a sink so a broken audio backend
//! can never stall a tick.

use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

/// A single tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    /// 0.0 ..= 1.0
    pub volume: f32,
}

impl Cue {
    pub const fn new(frequency_hz: f32, duration_secs: f32, volume: f32) -> Self {
        Self {
            frequency_hz,
            duration_secs,
            volume,
        }
    }

    /// Copy with the volume clamped into 0.0 ..= 1.0.
    pub fn clamped(self) -> Self {
        Self {
            volume: self.volume.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Anything that can emit a tone.
pub trait AudioCueSink: Send {
    fn play(&self, cue: Cue);
}

/// Tones used by the engine for each situation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuePalette {
    /// Emitted on each of the last five seconds of a phase.
    pub countdown: Cue,
    /// Emitted when a WORK phase ends.
    pub work_end: Cue,
    /// Emitted when a REST phase ends.
    pub rest_end: Cue,
}

impl Default for CuePalette {
    fn default() -> Self {
        Self {
            countdown: Cue::new(440.0, 0.1, 0.1),
            work_end: Cue::new(880.0, 0.2, 0.3),
            rest_end: Cue::new(660.0, 0.2, 0.3),
        }
    }
}

/// Plays `cue`, containing any panic raised by the sink.
pub(crate) fn play_isolated(sink: &dyn AudioCueSink, cue: Cue) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| sink.play(cue.clamped())));
    if result.is_err() {
        tracing::warn!(frequency_hz = cue.frequency_hz, "audio cue sink panicked; cue dropped");
    }
}

/// Sink for headless environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCueSink;

impl AudioCueSink for SilentCueSink {
    fn play(&self, _cue: Cue) {}
}

/// Sink that records cues to the tracing log instead of making sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCueSink;

impl AudioCueSink for TracingCueSink {
    fn play(&self, cue: Cue) {
        tracing::debug!(
            frequency_hz = cue.frequency_hz,
            duration_secs = cue.duration_secs,
            volume = cue.volume,
            "cue"
        );
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn volume_is_clamped_before_playing() {
        let sink = RecordingCueSink::default();
        play_isolated(&sink, Cue::new(440.0, 0.1, 3.0));
        assert_eq!(sink.played()[0].volume, 1.0);
    }

    #[test]
    fn panicking_sink_is_contained() {
        play_isolated(&PanickingCueSink, CuePalette::default().work_end);
    }

    #[test]
    fn end_of_phase_pitches_differ() {
        let palette = CuePalette::default();
        assert_ne!(palette.work_end.frequency_hz, palette.rest_end.frequency_hz);
    }
}

mod clock;
mod cue;
mod engine;
mod presets;
mod recovery;
mod snapshot;
mod tick_loop;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cue::{AudioCueSink, Cue, CuePalette, SilentCueSink, TracingCueSink};
pub use engine::{TimerEngine, TimerStatus, DEFAULT_REST_SECS, DEFAULT_WORK_SECS};
pub use presets::Preset;
pub use recovery::{Recovery, RecoveryResolver};
pub use snapshot::{MemorySnapshotStore, Phase, SnapshotStore, TimerSnapshot, SNAPSHOT_KEY};
pub use tick_loop::{SharedEngine, TickHandle, TickLoop, TICK_PERIOD};

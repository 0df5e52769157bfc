//! The 1 Hz scheduling loop that drives a [`TimerEngine`].
//!
//! The loop is a tokio task holding a shared handle to the engine. Each
//! tick takes the engine lock, checks that the run it was spawned for is
//! still current, and only then ticks. `stop()` bumps the run generation
//! under that same lock, so once it returns no further tick can land even
//! if the task was already waiting for the lock.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::TimerEngine;
use crate::error::TimerError;
use crate::events::Event;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub type SharedEngine = Arc<Mutex<TimerEngine>>;

/// Cancellation handle for a spawned tick task.
#[derive(Debug)]
pub struct TickHandle {
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owns an engine and the task ticking it.
///
/// Must be used from within a tokio runtime.
pub struct TickLoop {
    engine: SharedEngine,
    handle: Option<TickHandle>,
    events: mpsc::UnboundedSender<Event>,
}

impl TickLoop {
    /// Wrap `engine`. Events produced by ticks arrive on the returned
    /// receiver; command results are returned directly.
    pub fn new(engine: TimerEngine) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let tick_loop = Self {
            engine: Arc::new(Mutex::new(engine)),
            handle: None,
            events,
        };
        (tick_loop, rx)
    }

    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self) -> Result<Event, TimerError> {
        let (event, generation) = {
            let mut engine = lock(&self.engine);
            let event = engine.start()?;
            (event, engine.generation())
        };
        self.spawn(generation);
        Ok(event)
    }

    /// Begin ticking a run recovered at construction. Returns `false` if
    /// the engine is idle.
    pub fn resume(&mut self) -> bool {
        let generation = {
            let engine = lock(&self.engine);
            if !engine.phase().is_active() {
                return false;
            }
            engine.generation()
        };
        self.spawn(generation);
        true
    }

    pub fn stop(&mut self) -> Result<Event, TimerError> {
        let event = lock(&self.engine).stop()?;
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        Ok(event)
    }

    fn spawn(&mut self, generation: u64) {
        if let Some(previous) = self.handle.take() {
            previous.cancel();
        }
        let task = tokio::spawn(run(Arc::clone(&self.engine), generation, self.events.clone()));
        self.handle = Some(TickHandle { task });
    }
}

async fn run(engine: SharedEngine, generation: u64, events: mpsc::UnboundedSender<Event>) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let event = {
            let mut engine = lock(&engine);
            if engine.generation() != generation || !engine.phase().is_active() {
                break;
            }
            engine.tick()
        };
        if let Some(event) = event {
            if events.send(event).is_err() {
                tracing::debug!("event receiver dropped; ticking continues");
            }
        }
    }
    tracing::debug!(generation, "tick loop finished");
}

fn lock(engine: &SharedEngine) -> MutexGuard<'_, TimerEngine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

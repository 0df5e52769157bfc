use clap::Subcommand;
use ironlog_core::timer::{AudioCueSink, Cue, SystemClock, TracingCueSink};
use ironlog_core::{Config, Database, Event, Preset, TickLoop, TimerEngine};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use super::print_json;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a new run and tick until interrupted (Ctrl-C keeps the run)
    Start {
        /// Work phase length in seconds
        #[arg(long)]
        work: Option<u32>,
        /// Rest phase length in seconds
        #[arg(long)]
        rest: Option<u32>,
        /// Named preset (strength, hypertrophy, endurance, hiit)
        #[arg(long, conflicts_with_all = ["work", "rest"])]
        preset: Option<Preset>,
        /// Do not ring the terminal bell
        #[arg(long)]
        silent: bool,
        /// Print only phase changes and lifecycle events, not every tick
        #[arg(long)]
        transitions_only: bool,
    },
    /// Continue a persisted run and tick until interrupted
    Resume {
        #[arg(long)]
        silent: bool,
        #[arg(long)]
        transitions_only: bool,
    },
    /// Stop the persisted run; a `start` or `resume` ticking it exits on its next tick
    Stop,
    /// Print current timer state as JSON
    Status,
    /// List the built-in presets
    Presets,
}

/// Rings the terminal bell on stderr for every cue. `--silent` swaps it
/// for a sink that only logs.
struct TerminalBell;

impl AudioCueSink for TerminalBell {
    fn play(&self, cue: Cue) {
        let mut stderr = std::io::stderr();
        if stderr.write_all(b"\x07").and_then(|_| stderr.flush()).is_err() {
            tracing::debug!(frequency_hz = cue.frequency_hz, "terminal bell unavailable");
        }
    }
}

fn open_engine(config: &Config, silent: bool) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let cues: Box<dyn AudioCueSink> = if silent {
        Box::new(TracingCueSink)
    } else {
        Box::new(TerminalBell)
    };
    Ok(TimerEngine::new(Box::new(db), cues, Arc::new(SystemClock))
        .with_palette(config.cues.palette())
        .with_cues_enabled(config.cues.enabled))
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TimerAction::Start {
            work,
            rest,
            preset,
            silent,
            transitions_only,
        } => {
            let mut engine = open_engine(&config, silent)?;
            let (work, rest) = match preset {
                Some(p) => (p.work_secs(), p.rest_secs()),
                None => (
                    work.unwrap_or(config.timer.work_duration),
                    rest.unwrap_or(config.timer.rest_duration),
                ),
            };
            config.timer.check_duration("work", work)?;
            config.timer.check_duration("rest", rest)?;
            if engine.phase().is_active() {
                return Err(format!(
                    "a run is already in progress ({} s left in {}); use `timer resume` or `timer stop`",
                    engine.time_left_secs(),
                    engine.phase()
                )
                .into());
            }
            engine.set_work_duration(work)?;
            engine.set_rest_duration(rest)?;

            tokio::runtime::Runtime::new()?.block_on(start_and_drive(engine, transitions_only))?;
        }
        TimerAction::Resume {
            silent,
            transitions_only,
        } => {
            let engine = open_engine(&config, silent)?;
            let Some(recovered) = engine.recovery_event() else {
                return Err("no interval run to resume".into());
            };
            print_event(&recovered)?;

            tokio::runtime::Runtime::new()?.block_on(resume_and_drive(engine, transitions_only))?;
        }
        TimerAction::Stop => {
            let mut engine = open_engine(&config, true)?;
            print_event(&engine.stop()?)?;
        }
        TimerAction::Status => {
            let engine = open_engine(&config, true)?;
            print_json(&engine.snapshot())?;
        }
        TimerAction::Presets => {
            let presets: Vec<_> = Preset::ALL
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name(),
                        "work_secs": p.work_secs(),
                        "rest_secs": p.rest_secs(),
                    })
                })
                .collect();
            print_json(&presets)?;
        }
    }
    Ok(())
}

async fn start_and_drive(
    engine: TimerEngine,
    transitions_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut timer, events) = TickLoop::new(engine);
    print_event(&timer.start()?)?;
    drive(events, transitions_only).await
}

async fn resume_and_drive(
    engine: TimerEngine,
    transitions_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut timer, events) = TickLoop::new(engine);
    timer.resume();
    drive(events, transitions_only).await
}

/// Print tick events until Ctrl-C or until the run is stopped from another
/// terminal. On Ctrl-C the persisted snapshot is left in place so
/// `timer resume` can pick the run up again.
async fn drive(
    mut events: UnboundedReceiver<Event>,
    transitions_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if !transitions_only || event.is_transition() {
                    print_event(&event)?;
                }
                if matches!(event, Event::TimerStopped { .. }) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupted; run left persisted");
                break;
            }
        }
    }
    Ok(())
}

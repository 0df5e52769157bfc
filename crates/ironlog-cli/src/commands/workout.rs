use chrono::NaiveDate;
use clap::Subcommand;
use ironlog_core::stats::{best_estimates, last_performance, last_performances};
use ironlog_core::{Database, DateRange, NewSession, SetRecord, WorkoutStore};

use super::plan::{self, PlanAction};
use super::{print_json, today};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Log a finished session and report personal records
    Log {
        /// Session date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Working set as EXERCISE:WEIGHTxREPS, e.g. "Squat:100x5"
        #[arg(long = "set", required = true)]
        sets: Vec<String>,
        /// Warm-up set, same format; logged before the working sets
        #[arg(long = "warmup")]
        warmups: Vec<String>,
    },
    /// List logged sessions
    List {
        /// First date to include
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to include
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show what was lifted last time, for one exercise or all of them
    Last {
        exercise: Option<String>,
    },
    /// Delete a session and its sets
    Delete {
        id: i64,
    },
    /// Manage training plans
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;

    match action {
        WorkoutAction::Log {
            date,
            sets,
            warmups,
        } => {
            let mut records = Vec::with_capacity(warmups.len() + sets.len());
            for spec in &warmups {
                records.push(SetRecord::parse_spec(spec, true)?);
            }
            for spec in &sets {
                records.push(SetRecord::parse_spec(spec, false)?);
            }
            let session = NewSession::new(date.unwrap_or_else(today), records)?;
            let (stored, personal_records) = db.finish_session(&session)?;
            print_json(&serde_json::json!({
                "session": stored,
                "volume": stored.volume(),
                "personal_records": personal_records,
                "one_rep_max": best_estimates(&stored.sets),
            }))?;
        }
        WorkoutAction::List { from, to } => {
            let range = match (from, to) {
                (None, None) => None,
                (Some(from), None) => Some(DateRange::since(from)),
                (from, Some(to)) => Some(DateRange::new(from.unwrap_or(NaiveDate::MIN), to)?),
            };
            print_json(&db.sessions(range)?)?;
        }
        WorkoutAction::Last { exercise } => {
            let sessions = db.sessions(None)?;
            match exercise {
                Some(name) => match last_performance(&sessions, &name) {
                    Some(last) => print_json(&last)?,
                    None => return Err(format!("no sets logged for '{name}'").into()),
                },
                None => print_json(&last_performances(&sessions))?,
            }
        }
        WorkoutAction::Delete { id } => {
            if !db.delete_session(id)? {
                return Err(format!("session {id} not found").into());
            }
            println!("deleted session {id}");
        }
        WorkoutAction::Plan { action } => plan::run(action, &mut db)?,
    }
    Ok(())
}

use clap::{Subcommand, ValueEnum};
use ironlog_core::stats::{best_estimates, Grouping, StreakCalculator, VolumeAggregator, VolumeWindow, WeekScheme};
use ironlog_core::{Config, Database, DateRange, WorkoutStore};

use super::{print_json, today};

#[derive(Clone, Copy, ValueEnum)]
pub enum GroupBy {
    Muscle,
    Exercise,
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// Training volume (weight x reps) per muscle group or exercise
    Volume {
        /// 7d, 30d or all
        #[arg(long, default_value = "all")]
        window: VolumeWindow,
        #[arg(long, value_enum, default_value_t = GroupBy::Muscle)]
        by: GroupBy,
    },
    /// Consecutive weeks with at least one session
    Streak {
        /// Week numbering (january_anchored or iso8601), defaults to config
        #[arg(long)]
        scheme: Option<WeekScheme>,
    },
    /// Best estimated one-rep max per exercise
    OneRepMax {
        #[arg(long, default_value = "all")]
        window: VolumeWindow,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let today = today();

    match action {
        StatsAction::Volume { window, by } => {
            let sessions = db.sessions(window.cutoff(today).map(DateRange::since))?;
            let grouping = match by {
                GroupBy::Muscle => Grouping::MuscleGroup(config.muscle_group_map()),
                GroupBy::Exercise => Grouping::Exercise,
            };
            let report = VolumeAggregator::new(window, grouping).aggregate(&sessions, today);
            print_json(&report)?;
        }
        StatsAction::Streak { scheme } => {
            let scheme = scheme.unwrap_or(config.stats.week_scheme);
            let weeks = StreakCalculator::new(scheme).current_streak(db.session_dates()?, today);
            print_json(&serde_json::json!({
                "streak_weeks": weeks,
                "week_scheme": scheme,
            }))?;
        }
        StatsAction::OneRepMax { window } => {
            let sessions = db.sessions(window.cutoff(today).map(DateRange::since))?;
            let estimates = best_estimates(sessions.iter().flat_map(|s| &s.sets));
            print_json(&estimates)?;
        }
    }
    Ok(())
}

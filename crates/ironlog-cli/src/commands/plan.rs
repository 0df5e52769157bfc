use clap::Subcommand;
use ironlog_core::stats::plan_progress;
use ironlog_core::workout::search_catalogue;
use ironlog_core::{Config, Database, PlannedExercise, WorkoutPlan, WorkoutStore};

use super::print_json;

#[derive(Subcommand)]
pub enum PlanAction {
    /// List built-in and saved plans
    List,
    /// Show a plan with last performance and best estimated 1RM per exercise
    Show {
        name: String,
    },
    /// Save a new plan
    Create {
        /// Plan name (at most 30 characters)
        name: String,
        /// Exercise as EXERCISE or EXERCISE:SETSxREPS, e.g. "Squat:5x5"
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },
    /// Delete a saved plan
    Delete {
        name: String,
    },
    /// Browse the exercise catalogue
    Catalogue {
        /// Only this muscle group (Chest, Back, Legs, Shoulders, Biceps, Triceps)
        #[arg(long)]
        muscle: Option<String>,
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
    },
}

pub fn run(action: PlanAction, db: &mut Database) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::List => {
            print_json(&db.plans()?)?;
        }
        PlanAction::Show { name } => {
            let Some(plan) = db.plan(&name)? else {
                return Err(format!("plan '{name}' not found").into());
            };
            let sessions = db.sessions(None)?;
            print_json(&serde_json::json!({
                "name": plan.name,
                "builtin": plan.builtin,
                "total_sets": plan.total_sets(),
                "exercises": plan_progress(&plan, &sessions),
            }))?;
        }
        PlanAction::Create { name, exercises } => {
            let config = Config::load()?;
            let entries = exercises
                .iter()
                .map(|spec| PlannedExercise::parse_spec(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let plan = WorkoutPlan::new(&name, entries)?.canonicalize(&config.muscle_group_map())?;
            db.save_plan(&plan)?;
            print_json(&plan)?;
        }
        PlanAction::Delete { name } => {
            if WorkoutPlan::builtin(&name).is_some() {
                return Err(format!("'{name}' is a built-in plan and cannot be deleted").into());
            }
            if !db.delete_plan(&name)? {
                return Err(format!("plan '{name}' not found").into());
            }
            println!("deleted plan {name}");
        }
        PlanAction::Catalogue { muscle, search } => {
            print_json(&search_catalogue(&search, muscle.as_deref()))?;
        }
    }
    Ok(())
}

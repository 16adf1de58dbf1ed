use clap::Subcommand;
use paceline_core::timer::format_clock;
use paceline_core::{Config, WorkoutCatalog, WorkoutDefinition};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// List available workouts
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one workout as JSON
    Show {
        /// Workout id
        id: String,
    },
    /// Add or replace a custom workout from a JSON definition
    Add {
        /// JSON workout ({"id", "name", "segments": [...]})
        json: String,
    },
    /// Remove a custom workout
    Remove {
        /// Workout id
        id: String,
    },
}

pub fn run(action: WorkoutAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkoutAction::List { json } => {
            let workouts = config.catalog()?.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&workouts)?);
            } else {
                for w in workouts {
                    println!(
                        "{:<16} {:>8}  {:>2} segments  {}",
                        w.id,
                        format_clock(w.total_duration_secs()),
                        w.segments.len(),
                        w.name
                    );
                }
            }
        }
        WorkoutAction::Show { id } => {
            let workout = config
                .catalog()?
                .get(&id)
                .ok_or_else(|| format!("unknown workout: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&workout)?);
        }
        WorkoutAction::Add { json } => {
            let workout: WorkoutDefinition = serde_json::from_str(&json)?;
            workout.validate()?;
            // Rewrite only a file that loaded cleanly, never the fallback defaults.
            let mut config = Config::load()?;
            let id = workout.id.clone();
            match config.custom_workouts.iter_mut().find(|w| w.id == id) {
                Some(existing) => *existing = workout,
                None => config.custom_workouts.push(workout),
            }
            config.save()?;
            println!("workout saved: {id}");
        }
        WorkoutAction::Remove { id } => {
            let mut config = Config::load()?;
            let before = config.custom_workouts.len();
            config.custom_workouts.retain(|w| w.id != id);
            if config.custom_workouts.len() == before {
                return Err(format!("no custom workout with id: {id}").into());
            }
            config.save()?;
            println!("workout removed: {id}");
        }
    }
    Ok(())
}

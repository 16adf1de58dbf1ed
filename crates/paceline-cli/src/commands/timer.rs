use clap::Subcommand;
use paceline_core::timer::{Clock, Transition};
use paceline_core::{
    Action, Config, CoreError, Effect, InMemoryCatalog, LogRecorder, StateFile, SystemClock,
    TimerView, WorkoutController,
};
use serde::Serialize;
use tracing::debug;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a workout from the catalog
    Start {
        /// Workout id
        workout_id: String,
    },
    /// Pause the running workout
    Pause,
    /// Resume a paused workout
    Resume,
    /// Skip the rest of the current segment
    Skip,
    /// Apply a tick
    Tick {
        /// Timestamp in epoch milliseconds (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Print current timer state as JSON
    Status,
    /// End the workout early and record it
    End,
    /// Reset to idle state
    Reset,
}

#[derive(Serialize)]
struct Output<'a> {
    view: TimerView,
    effects: &'a [Effect],
}

type Controller = WorkoutController<InMemoryCatalog, LogRecorder>;

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let file = StateFile::open()?;
    let mut controller =
        WorkoutController::new(config.catalog()?, LogRecorder, config.machine()).with_state(file.load()?);
    let now = SystemClock.now_ms();

    // No tick source runs between invocations, so wall time since the last
    // command is delivered as one tick before acting on the new command.
    let mut effects = match action {
        TimerAction::Start { .. }
        | TimerAction::Pause
        | TimerAction::Skip
        | TimerAction::Status
        | TimerAction::End => catch_up(&mut controller, now),
        _ => Vec::new(),
    };

    let result = match action {
        TimerAction::Start { workout_id } => controller.handle(&Action::Start { workout_id }, now),
        TimerAction::Pause => controller.handle(&Action::Pause, now),
        TimerAction::Resume => controller.handle(&Action::Resume, now),
        TimerAction::Skip => controller.handle(&Action::Skip, now),
        TimerAction::Tick { at } => controller.handle(&Action::Tick, at.unwrap_or(now)),
        TimerAction::End => controller.handle(&Action::EndEarly, now),
        TimerAction::Reset => controller.handle(&Action::Reset, now),
        TimerAction::Status => Ok(Transition {
            state: controller.state().clone(),
            effects: Vec::new(),
        }),
    };

    // Persist whatever the catch-up tick did even if the command itself was rejected.
    file.save(controller.state())?;
    let transition = result?;
    effects.extend(transition.effects);

    let view = if config.display.sub_second_countdown {
        controller.view(now)
    } else {
        TimerView::from_state(controller.state())
    };
    let output = Output {
        view,
        effects: &effects,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn catch_up(controller: &mut Controller, now: i64) -> Vec<Effect> {
    if !controller.state().running {
        return Vec::new();
    }
    match controller.handle(&Action::Tick, now) {
        Ok(transition) => transition.effects,
        Err(CoreError::Rejected(reason)) => {
            debug!(%reason, "catch-up tick not applied");
            Vec::new()
        }
        Err(e) => {
            debug!(error = %e, "catch-up tick failed");
            Vec::new()
        }
    }
}

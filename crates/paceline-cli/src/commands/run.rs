use std::sync::Arc;

use paceline_core::{
    spawn_controller, Config, ControllerHandle, CoreError, LogRecorder, Phase, SystemClock,
    TimerView, WorkoutController,
};
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn run(workout_id: String, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_live(workout_id, config))
}

async fn run_live(workout_id: String, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let controller = WorkoutController::new(config.catalog()?, LogRecorder, config.machine());
    let (handle, task) = spawn_controller(controller, Arc::new(SystemClock), config.tick_period());

    handle.start(workout_id).await?;
    let mut views = handle.subscribe();
    print_view(&handle.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view);
                if view.phase == Phase::Completed {
                    println!("workout complete");
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    None => stdin_open = false,
                    Some(input) => {
                        if !dispatch(&handle, input.trim()).await? {
                            break;
                        }
                    }
                }
            }
        }
    }

    drop(views);
    drop(handle);
    task.await?;
    Ok(())
}

/// Returns false when the user asked to quit.
async fn dispatch(handle: &ControllerHandle, input: &str) -> Result<bool, CoreError> {
    let result = match input {
        "p" | "pause" => handle.pause().await,
        "r" | "resume" => handle.resume().await,
        "s" | "skip" => handle.skip().await,
        "q" | "quit" | "end" => {
            handle.end_early().await?;
            println!("workout ended");
            return Ok(false);
        }
        "" => return Ok(true),
        other => {
            eprintln!("unknown command: {other} (p, r, s, q)");
            return Ok(true);
        }
    };

    match result {
        Ok(_) => Ok(true),
        // Pausing twice and similar slips are reported, not fatal.
        Err(CoreError::Rejected(reason)) => {
            eprintln!("{reason}");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

fn print_view(view: &TimerView) {
    let pace = view.segment_pace.map(|p| p.as_str()).unwrap_or("-");
    println!(
        "[{}/{}] {:<12} {:<9} elapsed {}  remaining {}  {:>3.0}%  {:?}",
        view.segment_index + 1,
        view.segment_count,
        view.segment_label,
        pace,
        view.elapsed_display,
        view.remaining_display,
        view.progress_fraction * 100.0,
        view.phase,
    );
}

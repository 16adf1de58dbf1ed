use clap::{Parser, Subcommand};
use paceline_core::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "paceline", version, about = "Paceline workout timer CLI")]
struct Cli {
    /// Log filter (trace, debug, info, warn, error). PACELINE_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step the timer one command at a time
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Browse the workout catalog
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a workout live: p = pause, r = resume, s = skip, q = end
    Run {
        /// Workout id (see `workout list`)
        workout_id: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Workout { action } => commands::workout::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run { workout_id } => commands::run::run(workout_id, &config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env("PACELINE_LOG")
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries JSON output, so logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

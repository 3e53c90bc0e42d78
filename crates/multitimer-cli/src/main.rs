use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "multitimer", version, about = "Multi-timer Pomodoro CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and control timers
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Keep running timers ticking and stream events as JSON lines.
    ///
    /// While watch runs it owns the timer state: edits made by other
    /// invocations in the meantime are overwritten by its next save.
    Watch(commands::watch::WatchArgs),
    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Daily midnight reset
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    // Logs go to stderr so stdout stays machine-readable.
    let filter = EnvFilter::try_from_env("MULTITIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Theme { action } => commands::theme::run(action),
        Commands::Day { action } => commands::day::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

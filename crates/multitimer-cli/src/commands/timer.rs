use clap::Subcommand;
use multitimer_core::{Command, Config, TimerId, TimerMode};

use super::{open_service, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Add a new paused countdown timer
    Create,
    /// Print every timer as JSON
    List,
    /// Print one timer as JSON
    Status { id: TimerId },
    /// Start counting
    Start { id: TimerId },
    /// Stop counting, keeping the current value
    Pause { id: TimerId },
    /// Start if paused, pause if running
    Toggle { id: TimerId },
    /// Stop and go back to a fresh work phase
    Reset { id: TimerId },
    /// Remove a timer for good
    Delete {
        id: TimerId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Set the title (trimmed, at most 20 characters)
    Rename { id: TimerId, title: String },
    /// Set the work length in whole minutes (1-60)
    Duration {
        id: TimerId,
        #[arg(allow_hyphen_values = true)]
        minutes: String,
    },
    /// Switch between countdown and stopwatch
    Mode { id: TimerId, mode: String },
}

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load_or_default();
    let mut service = open_service(&config)?;

    let command = match action {
        TimerAction::List => return print_json(&service.list()),
        TimerAction::Status { id } => return print_json(&service.view(id)?),
        TimerAction::Create => Command::Create,
        TimerAction::Start { id } => Command::Start { id },
        TimerAction::Pause { id } => Command::Pause { id },
        TimerAction::Toggle { id } => Command::Toggle { id },
        TimerAction::Reset { id } => Command::Reset { id },
        TimerAction::Delete { id, yes } => {
            if !yes {
                let title = service.view(id)?.title;
                return Err(format!("refusing to delete \"{title}\" without --yes").into());
            }
            Command::Delete { id }
        }
        TimerAction::Rename { id, title } => Command::Rename { id, text: title },
        TimerAction::Duration { id, minutes } => Command::SetDuration { id, minutes },
        TimerAction::Mode { id, mode } => Command::SetMode {
            id,
            mode: mode.parse::<TimerMode>()?,
        },
    };

    let view = service.dispatch(command)?;
    print_json(&view)
}

pub mod config;
pub mod day;
pub mod theme;
pub mod timer;
pub mod watch;

use multitimer_core::{
    Completion, Config, Database, Notifier, NullNotifier, ServiceOptions, SystemClock,
    TimerService,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;
pub type Service = TimerService<Database, SystemClock>;

/// Open the on-disk state: load, catch up, run the midnight check.
pub fn open_service(config: &Config) -> Result<Service, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let service = TimerService::open_with_notifier(
        db,
        SystemClock,
        ServiceOptions::from_config(config),
        notifier(config),
    )?;
    Ok(service)
}

fn notifier(config: &Config) -> Box<dyn Notifier> {
    if !config.notifications.enabled {
        return Box::new(NullNotifier);
    }
    let bell = config.notifications.bell;
    Box::new(move |completion: &Completion| {
        if bell {
            eprint!("\x07");
        }
        eprintln!(
            "{} finished, {} next",
            completion.finished, completion.next
        );
    })
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

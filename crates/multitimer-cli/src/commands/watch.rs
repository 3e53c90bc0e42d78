//! Foreground driver: ticks every running timer until interrupted.

use std::time::Duration;

use clap::Args;
use multitimer_core::{driver, Config, DriverSettings};
use tracing::{info, warn};

use super::{open_service, CliResult};

// The in-memory state wins: edits made by other invocations while this
// runs are overwritten by the next save.
#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub seconds: Option<u64>,
}

pub fn run(args: WatchArgs) -> CliResult {
    let config = Config::load_or_default();
    let mut service = open_service(&config)?;
    let settings = DriverSettings::from_config(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let limit = args.seconds.map(Duration::from_secs);
        let shutdown = async move {
            match limit {
                Some(limit) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = tokio::time::sleep(limit) => {}
                    }
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!(error = %e, "cannot listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                }
            }
        };

        // Show the starting state before anything ticks.
        for view in service.list() {
            print_line(&view);
        }
        for event in service.drain_events() {
            print_line(&event);
        }
        driver::run(&mut service, settings, shutdown, |event| print_line(event)).await;
    });

    info!("watch stopped");
    service.persist()?;
    Ok(())
}

fn print_line<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "cannot serialize event"),
    }
}

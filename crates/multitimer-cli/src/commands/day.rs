use clap::Subcommand;
use multitimer_core::{Clock, Config};
use serde_json::json;

use super::{open_service, print_json, CliResult};

#[derive(Subcommand)]
pub enum DayAction {
    /// Show when the next midnight reset happens
    Status,
    /// Reset every timer now, as if midnight had passed
    Reset,
}

pub fn run(action: DayAction) -> CliResult {
    let config = Config::load_or_default();
    let mut service = open_service(&config)?;
    if let DayAction::Reset = action {
        service.force_daily_reset()?;
    }
    print_json(&json!({
        "enabled": config.daily_reset.enabled,
        "zone": service.zone().label(service.clock().now()),
        "next_reset_at": service.next_reset_at(),
        "timers": service.list(),
    }))
}

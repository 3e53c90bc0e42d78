use clap::Subcommand;
use multitimer_core::{Config, Theme};
use serde_json::json;

use super::{open_service, print_json, CliResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Set the theme (dark or light)
    Set { theme: String },
    /// Switch between dark and light
    Toggle,
}

pub fn run(action: ThemeAction) -> CliResult {
    let config = Config::load_or_default();
    let mut service = open_service(&config)?;
    let theme = match action {
        ThemeAction::Get => service.theme(),
        ThemeAction::Set { theme } => service.set_theme(theme.parse::<Theme>()?)?,
        ThemeAction::Toggle => service.toggle_theme()?,
    };
    print_json(&json!({ "theme": theme }))
}

use clap::Parser;
use domain::constants::LOG_ENV;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

pub use cli::*;
pub use domain::models::*;
pub use services::bootstrap::create_markers;
pub use services::checks::check_markers;
pub use services::graph::DiskGraphSource;
pub use services::history::SqliteHistory;
pub use services::inspector::Inspector;
pub use services::output::{print_one, print_status};
pub use services::rebase::RebaseEngine;
pub use services::registry::AppRegistry;
pub use services::settings::{load_settings, Settings};
pub use services::vcs::GitProbe;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(&cli.config)?;
    let registry = AppRegistry::from_settings(&settings);
    tracing::debug!(apps = registry.apps().len(), "registry ready");

    if let Some(code) = commands::handle_check(&cli, &registry)? {
        return Ok(code);
    }
    if let Some(code) = commands::handle_create_markers(&cli, &registry)? {
        return Ok(code);
    }
    if let Some(code) = commands::handle_rebase(&cli, &settings, &registry)? {
        return Ok(code);
    }
    Ok(ExitCode::SUCCESS)
}

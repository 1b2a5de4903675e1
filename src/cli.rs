use crate::domain::constants::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "migline",
    version,
    about = "Keep Django-style migration histories linear"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_FILE,
        help = "Project settings file"
    )]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every first-party app's max_migration.txt against its migrations.
    Check {
        #[arg(long = "app", value_name = "LABEL", help = "Only check these apps")]
        apps: Vec<String>,
    },
    /// Create max_migration.txt files for first-party apps.
    CreateMarkers {
        #[arg(value_name = "LABEL")]
        labels: Vec<String>,
        #[arg(long, default_value_t = false, help = "Report what would be created")]
        dry_run: bool,
        #[arg(long, default_value_t = false, help = "Recreate existing files too")]
        recreate: bool,
    },
    /// Fix a two-way conflict by rebasing one migration onto the other.
    Rebase {
        #[arg(value_name = "LABEL")]
        app_label: String,
    },
}

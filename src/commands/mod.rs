//! Command handler layer.
//!
//! ## Files
//! - `diagnose.rs`: `check`.
//! - `repair.rs`: `create-markers` and `rebase`.
//!
//! Handlers return `Ok(None)` when the command is not theirs and the process
//! exit code otherwise. Business logic lives in `services/*`.

pub mod diagnose;
pub mod repair;

pub use diagnose::handle_check;
pub use repair::{handle_create_markers, handle_rebase};

use crate::services::registry::AppRegistry;
use std::process::ExitCode;

pub(crate) fn reject_unknown_labels(registry: &AppRegistry, labels: &[String]) -> Option<ExitCode> {
    let unknown = registry.unknown_labels(labels);
    for label in &unknown {
        eprintln!("No installed app with label '{}'.", label);
    }
    (!unknown.is_empty()).then_some(ExitCode::from(2))
}

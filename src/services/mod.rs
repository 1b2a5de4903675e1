//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `settings.rs`: `migline.toml` loading.
//! - `registry.rs`: app list and first-party policy.
//! - `pysource.rs`: Python tokenizer and `dependencies` locator.
//! - `inspector.rs`: migrations directory listing.
//! - `marker.rs`: `max_migration.txt` reading, conflict blocks, writing.
//! - `graph.rs`: dependency graph, leaves, conflicts, plans.
//! - `checks.rs`: marker consistency findings.
//! - `history.rs`: applied-migration stores.
//! - `vcs.rs`: merge-in-progress probe.
//! - `tools.rs`: formatter and unwind commands.
//! - `rebase.rs`: conflict rebase engine.
//! - `bootstrap.rs`: create-markers.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod bootstrap;
pub mod checks;
pub mod graph;
pub mod history;
pub mod inspector;
pub mod marker;
pub mod output;
pub mod pysource;
pub mod rebase;
pub mod registry;
pub mod settings;
pub mod tools;
pub mod vcs;

//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep finding/report structs in one place.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs`: findings, rebase and create-markers reports, JSON envelope.
//! - `constants.rs`: marker file name, conflict markers, defaults.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem or process side effects.
//!
//! ## Compatibility note
//! Changes in these structs affect `--json` outputs.
//! Keep schema-impacting changes synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;

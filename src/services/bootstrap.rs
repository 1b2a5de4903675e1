use crate::domain::models::{CreateMarkersReport, MarkerAction};
use crate::services::inspector::Inspector;
use crate::services::marker::write_marker;
use crate::services::registry::AppRegistry;
use anyhow::Context;
use std::collections::BTreeSet;

pub fn create_markers(
    registry: &AppRegistry,
    inspector: &mut Inspector<'_>,
    labels: &BTreeSet<String>,
    dry_run: bool,
    recreate: bool,
) -> anyhow::Result<CreateMarkersReport> {
    let mut report = CreateMarkersReport {
        dry_run,
        actions: Vec::new(),
    };
    for app in registry.first_party() {
        if !labels.is_empty() && !labels.contains(&app.label) {
            continue;
        }
        let Some(details) = inspector.inspect(&app.label, false) else {
            continue;
        };
        if !details.has_migrations() {
            continue;
        }
        let marker = details.marker_path();
        if !recreate && marker.exists() {
            continue;
        }
        let Some(name) = details.names().iter().next_back() else {
            continue;
        };
        if !dry_run {
            write_marker(&marker, name)
                .with_context(|| format!("could not write {}", marker.display()))?;
        }
        tracing::debug!(app = %app.label, %name, dry_run, "marker");
        report.actions.push(MarkerAction {
            app: app.label.clone(),
            name: name.clone(),
            status: if dry_run { "would_create" } else { "created" }.to_string(),
        });
    }
    Ok(report)
}

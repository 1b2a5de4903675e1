//! Marker consistency checks.

use crate::domain::models::{Finding, FindingKind};
use crate::services::graph::{GraphSource, NodeKey};
use crate::services::inspector::Inspector;
use crate::services::marker::{read_marker, MarkerState};
use crate::services::registry::AppRegistry;
use std::collections::{BTreeMap, BTreeSet};

/// Checks every first-party app's `max_migration.txt` against the graph.
///
/// `restrict_to` limits the per-app checks; conflict detection always covers
/// all first-party apps. Only structural graph errors come back as `Err`.
pub fn check_markers(
    registry: &AppRegistry,
    inspector: &mut Inspector<'_>,
    graph_source: &dyn GraphSource,
    restrict_to: Option<&BTreeSet<String>>,
) -> anyhow::Result<Vec<Finding>> {
    let graph = graph_source.load(registry)?;
    let first_party: BTreeSet<&str> = registry.first_party().map(|a| a.label.as_str()).collect();

    let conflicts: BTreeMap<String, Vec<String>> = graph
        .conflicts()
        .into_iter()
        .filter(|(app, _)| first_party.contains(app.as_str()))
        .collect();
    if !conflicts.is_empty() {
        let listing: String = conflicts
            .iter()
            .map(|(app, names)| format!("\n* {}: {}", app, names.join(", ")))
            .collect();
        return Ok(vec![Finding::new(
            FindingKind::MultiHeadConflict,
            None,
            format!(
                "Conflicting migrations detected - multiple leaf nodes detected for these apps:{}",
                listing
            ),
            "Fix the conflict, e.g. with 'migline rebase <app>' or a merge migration.",
        )]);
    }

    let targets: Vec<NodeKey> = graph
        .leaf_nodes()
        .into_iter()
        .filter(|(app, _)| first_party.contains(app.as_str()))
        .collect();
    let mut heads: BTreeMap<String, String> = BTreeMap::new();
    for (app, name) in graph.plan(&targets, true) {
        heads.insert(app, name);
    }

    let mut findings = Vec::new();
    for app in registry.first_party() {
        let label = app.label.as_str();
        if restrict_to.is_some_and(|only| !only.contains(label)) {
            continue;
        }
        let Some(details) = inspector.inspect(label, false) else {
            continue;
        };
        if !details.has_migrations() {
            continue;
        }

        let finding = match read_marker(&details.marker_path()) {
            MarkerState::Missing => Some(Finding::new(
                FindingKind::MissingMarker,
                Some(label),
                format!("{}'s max_migration.txt does not exist.", label),
                "If you just started using migline, run 'migline create-markers'. \
                 Otherwise, check how it has gone missing.",
            )),
            MarkerState::Unreadable(reason) => Some(Finding::new(
                FindingKind::UnreadableMarker,
                Some(label),
                format!("{}'s max_migration.txt could not be read: {}", label, reason),
                "Rewrite the file as UTF-8 text holding the latest migration's name.",
            )),
            MarkerState::MultiLine(_) => Some(Finding::new(
                FindingKind::MultiLineMarker,
                Some(label),
                format!("{}'s max_migration.txt contains multiple lines.", label),
                format!(
                    "This may be the result of a git merge. Fix the file to contain only \
                     the name of the latest migration, or maybe use 'migline rebase {}'.",
                    label
                ),
            )),
            MarkerState::Single(name) if !details.names().contains(&name) => Some(Finding::new(
                FindingKind::DanglingReference,
                Some(label),
                format!(
                    "{}'s max_migration.txt points to non-existent migration '{}'.",
                    label, name
                ),
                "Edit the max_migration.txt to contain the latest migration's name.",
            )),
            MarkerState::Single(name) => match heads.get(label) {
                Some(head) if *head != name => Some(Finding::new(
                    FindingKind::StaleReference,
                    Some(label),
                    format!(
                        "{}'s max_migration.txt contains '{}', but the latest migration is '{}'.",
                        label, name, head
                    ),
                    format!(
                        "Edit max_migration.txt to contain '{}' or rearrange the migrations \
                         into the correct order.",
                        head
                    ),
                )),
                Some(_) => None,
                None => {
                    tracing::debug!(app = %label, "no graph nodes for app, skipping head comparison");
                    None
                }
            },
        };
        findings.extend(finding);
    }
    Ok(findings)
}

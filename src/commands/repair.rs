use crate::*;
use std::collections::BTreeSet;
use std::process::ExitCode;

pub fn handle_create_markers(cli: &Cli, registry: &AppRegistry) -> anyhow::Result<Option<ExitCode>> {
    let Commands::CreateMarkers {
        labels,
        dry_run,
        recreate,
    } = &cli.command
    else {
        return Ok(None);
    };
    if let Some(code) = super::reject_unknown_labels(registry, labels) {
        return Ok(Some(code));
    }

    let labels: BTreeSet<String> = labels.iter().cloned().collect();
    let mut inspector = Inspector::new(registry);
    let report = create_markers(registry, &mut inspector, &labels, *dry_run, *recreate)?;
    print_one(cli.json, report, |r| {
        if r.actions.is_empty() {
            "No max_migration.txt files need creating.".to_string()
        } else {
            r.actions
                .iter()
                .map(MarkerAction::message)
                .collect::<Vec<_>>()
                .join("\n")
        }
    })?;
    Ok(Some(ExitCode::SUCCESS))
}

pub fn handle_rebase(
    cli: &Cli,
    settings: &Settings,
    registry: &AppRegistry,
) -> anyhow::Result<Option<ExitCode>> {
    let Commands::Rebase { app_label } = &cli.command else {
        return Ok(None);
    };

    let history = SqliteHistory::from_settings(settings);
    let engine = RebaseEngine::new(
        registry,
        &history,
        &GitProbe,
        &settings.rebase,
        settings.root.clone(),
    );
    let report = engine.rebase(app_label)?;
    print_one(cli.json, report, RebaseReport::summary)?;
    Ok(Some(ExitCode::SUCCESS))
}

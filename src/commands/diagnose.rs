use crate::*;
use std::collections::BTreeSet;
use std::process::ExitCode;

pub fn handle_check(cli: &Cli, registry: &AppRegistry) -> anyhow::Result<Option<ExitCode>> {
    let Commands::Check { apps } = &cli.command else {
        return Ok(None);
    };
    if let Some(code) = super::reject_unknown_labels(registry, apps) {
        return Ok(Some(code));
    }

    let restrict_to: Option<BTreeSet<String>> =
        (!apps.is_empty()).then(|| apps.iter().cloned().collect());
    let mut inspector = Inspector::new(registry);
    let findings = check_markers(registry, &mut inspector, &DiskGraphSource, restrict_to.as_ref())?;

    print_status(cli.json, findings.is_empty(), &findings, |fs| {
        if fs.is_empty() {
            return "no issues found".to_string();
        }
        fs.iter()
            .map(|f| format!("{}: {}\n\tHINT: {}", f.id, f.message, f.hint))
            .collect::<Vec<_>>()
            .join("\n")
    })?;

    Ok(Some(if findings.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }))
}

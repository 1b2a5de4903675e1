//! External commands run around a rebase.

use anyhow::{bail, Context};
use std::path::Path;
use std::process::{Command, Stdio};

pub fn run_formatter(argv: &[String], file: &Path, cwd: &Path) {
    let Some((program, args)) = argv.split_first() else {
        return;
    };
    let status = Command::new(program)
        .args(args)
        .arg(file)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(s) if s.success() => tracing::debug!(%program, file = %file.display(), "formatted"),
        Ok(s) => tracing::warn!(%program, code = ?s.code(), "formatter failed, leaving file as written"),
        Err(e) => tracing::warn!(%program, error = %e, "could not run formatter"),
    }
}

pub fn substitute(argv: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    argv.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("{{{}}}", key), value)
            })
        })
        .collect()
}

pub fn run_unwind(argv: &[String], vars: &[(&str, &str)], cwd: &Path) -> anyhow::Result<()> {
    let argv = substitute(argv, vars);
    let Some((program, args)) = argv.split_first() else {
        bail!("no unwind command configured");
    };
    let out = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("could not run unwind command '{}'", program))?;
    if !out.status.success() {
        bail!(
            "unwind command '{}' failed: {}",
            program,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(())
}

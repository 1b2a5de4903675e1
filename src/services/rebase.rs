//! Conflict rebase: re-parents the rebased migration onto the merged one and
//! renumbers it after it.

use crate::domain::models::RebaseReport;
use crate::services::history::{migration_applied, HistoryStore};
use crate::services::inspector::MigrationDetails;
use crate::services::marker::{find_conflict_names, orient, write_marker};
use crate::services::pysource::{parse_migration, quote_str, splice};
use crate::services::registry::AppRegistry;
use crate::services::settings::RebaseSettings;
use crate::services::tools::{run_formatter, run_unwind};
use crate::services::vcs::MergeProbe;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(thiserror::Error, Debug)]
pub enum RebaseError {
    #[error("No installed app with label '{0}'.")]
    UnknownApp(String),
    #[error("'{0}' is not a first-party app.")]
    NotFirstParty(String),
    #[error("{0} does not have a max_migration.txt.")]
    NoMarker(String),
    #[error("{0}'s max_migration.txt does not seem to contain a merge conflict.")]
    NoConflict(String),
    #[error("Parsed '{name}' as the already-merged migration name from {app}'s max_migration.txt, but this migration does not exist.")]
    MergedMissing { app: String, name: String },
    #[error("Parsed '{name}' as the rebased migration name from {app}'s max_migration.txt, but this migration does not exist.")]
    RebasedMissing { app: String, name: String },
    #[error("Detected '{0}' as the rebased migration filename, but it does not exist.")]
    RebasedFileMissing(String),
    #[error("Detected {0} as the rebased migration, but it is applied to the local database. Undo the rebase, reverse the migration, and try again.")]
    Applied(String),
    #[error("Could not find dependencies = [...] in '{0}'")]
    NoDependencies(String),
    #[error("Could not parse '{file}': {detail}.")]
    Parse { file: String, detail: String },
    #[error("Cannot edit '{file}' since it has {count} dependencies within {app}.")]
    DependencyCount {
        file: String,
        count: usize,
        app: String,
    },
    #[error("Could not determine the number of migration '{0}'.")]
    BadNumber(String),
    #[error("Cannot rename '{file}' to '{new}' since it already exists.")]
    TargetExists { file: String, new: String },
    #[error("Could not access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> RebaseError + '_ {
    move |source| RebaseError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseStage {
    Validating,
    Parsing,
    Rewriting,
    Renaming,
    Done,
}

/// Rewrites the single same-app dependency of `src` to point at `merged`.
///
/// Only the name literal is replaced; its quote style is kept and every other
/// byte of the file is left as written.
pub fn rewrite_dependencies(
    src: &str,
    file: &str,
    app: &str,
    merged: &str,
) -> Result<String, RebaseError> {
    let parsed = parse_migration(src).map_err(|e| RebaseError::Parse {
        file: file.to_string(),
        detail: e.to_string(),
    })?;
    let deps = parsed
        .dependencies
        .ok_or_else(|| RebaseError::NoDependencies(file.to_string()))?;
    let own: Vec<_> = deps.literal_pairs().filter(|p| p.app == app).collect();
    let [pair] = own.as_slice() else {
        return Err(RebaseError::DependencyCount {
            file: file.to_string(),
            count: own.len(),
            app: app.to_string(),
        });
    };
    Ok(splice(src, pair.name_span.clone(), &quote_str(merged, pair.quote)))
}

pub fn next_name(merged: &str, rebased: &str) -> Result<String, RebaseError> {
    let number: u64 = merged
        .split_once('_')
        .and_then(|(prefix, _)| prefix.parse().ok())
        .ok_or_else(|| RebaseError::BadNumber(merged.to_string()))?;
    let (_, rest) = rebased
        .split_once('_')
        .ok_or_else(|| RebaseError::BadNumber(rebased.to_string()))?;
    Ok(format!("{:04}_{}", number + 1, rest))
}

pub struct RebaseEngine<'a> {
    registry: &'a AppRegistry,
    history: &'a [Box<dyn HistoryStore>],
    probe: &'a dyn MergeProbe,
    settings: &'a RebaseSettings,
    workdir: PathBuf,
}

impl<'a> RebaseEngine<'a> {
    pub fn new(
        registry: &'a AppRegistry,
        history: &'a [Box<dyn HistoryStore>],
        probe: &'a dyn MergeProbe,
        settings: &'a RebaseSettings,
        workdir: PathBuf,
    ) -> Self {
        Self {
            registry,
            history,
            probe,
            settings,
            workdir,
        }
    }

    pub fn rebase(&self, label: &str) -> Result<RebaseReport, RebaseError> {
        stage(label, RebaseStage::Validating);
        let app = self
            .registry
            .get(label)
            .ok_or_else(|| RebaseError::UnknownApp(label.to_string()))?;
        if !app.first_party {
            return Err(RebaseError::NotFirstParty(label.to_string()));
        }
        let details = app
            .migrations_dir
            .as_ref()
            .and_then(|dir| MigrationDetails::load(label, dir))
            .ok_or_else(|| RebaseError::NoMarker(label.to_string()))?;
        let marker = details.marker_path();
        if !marker.exists() {
            return Err(RebaseError::NoMarker(label.to_string()));
        }

        let raw = fs::read_to_string(&marker).map_err(io_err(&marker))?;
        let lines: Vec<&str> = raw.lines().collect();
        let names =
            find_conflict_names(&lines).ok_or_else(|| RebaseError::NoConflict(label.to_string()))?;
        let merging = self.probe.merge_in_progress(details.dir());
        let (merged, rebased) = orient(names, merging);
        tracing::debug!(app = %label, %merged, %rebased, merging, "read conflict block");

        if !details.names().contains(&merged) {
            return Err(RebaseError::MergedMissing {
                app: label.to_string(),
                name: merged,
            });
        }
        if !details.names().contains(&rebased) {
            return Err(RebaseError::RebasedMissing {
                app: label.to_string(),
                name: rebased,
            });
        }
        let old_filename = MigrationDetails::source_filename(&rebased);
        let old_path = details.source_path(&rebased);
        if !old_path.is_file() {
            return Err(RebaseError::RebasedFileMissing(old_filename));
        }
        self.ensure_unapplied(label, &merged, &rebased)?;

        stage(label, RebaseStage::Parsing);
        let src = fs::read_to_string(&old_path).map_err(io_err(&old_path))?;
        let content = rewrite_dependencies(&src, &old_filename, label, &merged)?;
        let new_name = next_name(&merged, &rebased)?;
        let new_filename = MigrationDetails::source_filename(&new_name);
        let new_path = details.source_path(&new_name);
        if new_path != old_path && new_path.exists() {
            return Err(RebaseError::TargetExists {
                file: old_filename,
                new: new_filename,
            });
        }

        stage(label, RebaseStage::Rewriting);
        let mut tmp = NamedTempFile::new_in(details.dir()).map_err(io_err(details.dir()))?;
        tmp.write_all(content.as_bytes())
            .map_err(io_err(tmp.path()))?;
        let perms = fs::metadata(&old_path)
            .map_err(io_err(&old_path))?
            .permissions();
        fs::set_permissions(tmp.path(), perms).map_err(io_err(tmp.path()))?;

        stage(label, RebaseStage::Renaming);
        tmp.persist(&new_path)
            .map_err(|e| io_err(&new_path)(e.error))?;
        if new_path != old_path {
            fs::remove_file(&old_path).map_err(io_err(&old_path))?;
        }
        write_marker(&marker, &new_name).map_err(io_err(&marker))?;
        run_formatter(&self.settings.formatter, &new_path, details.dir());

        stage(label, RebaseStage::Done);
        Ok(RebaseReport {
            app: label.to_string(),
            merged_name: merged,
            rebased_name: rebased,
            new_name,
            old_filename,
            new_filename,
            marker_updated: true,
        })
    }

    fn ensure_unapplied(&self, app: &str, merged: &str, rebased: &str) -> Result<(), RebaseError> {
        if !migration_applied(self.history, app, rebased) {
            return Ok(());
        }
        let applied = || RebaseError::Applied(rebased.to_string());
        if self.settings.unwind.is_empty() {
            return Err(applied());
        }
        let vars = [("app", app), ("merged", merged), ("rebased", rebased)];
        if let Err(e) = run_unwind(&self.settings.unwind, &vars, &self.workdir) {
            tracing::warn!(%app, error = %e, "unwind failed");
            return Err(applied());
        }
        if migration_applied(self.history, app, rebased) {
            return Err(applied());
        }
        tracing::debug!(%app, %rebased, "unwound applied migration");
        Ok(())
    }
}

fn stage(app: &str, stage: RebaseStage) {
    tracing::debug!(%app, ?stage, "rebase");
}

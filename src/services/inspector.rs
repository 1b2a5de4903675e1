//! Migration directory inspection.
//!
//! Mirrors how a Python import system sees a migrations package: a directory
//! with `__init__.py` is a package, one without is a namespace package (which
//! the framework ignores), and a lone `migrations.py` is a plain module.

use crate::domain::constants::MARKER_FILENAME;
use crate::services::registry::AppRegistry;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const MODULE_SUFFIXES: [&str; 4] = [".py", ".pyc", ".pyd", ".so"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Package,
    Namespace,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDetails {
    pub app_label: String,
    dir: PathBuf,
    kind: ModuleKind,
    names: BTreeSet<String>,
}

impl MigrationDetails {
    pub fn load(app_label: &str, module_dir: &Path) -> Option<Self> {
        let kind = if module_dir.is_dir() {
            if module_dir.join("__init__.py").is_file() {
                ModuleKind::Package
            } else {
                ModuleKind::Namespace
            }
        } else if module_dir.with_extension("py").is_file() {
            ModuleKind::Plain
        } else {
            return None;
        };

        let names = if kind == ModuleKind::Plain {
            BTreeSet::new()
        } else {
            unit_names(module_dir)
        };
        Some(Self {
            app_label: app_label.to_string(),
            dir: module_dir.to_path_buf(),
            kind,
            names,
        })
    }

    pub fn has_migrations(&self) -> bool {
        self.kind == ModuleKind::Package && !self.names.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(MARKER_FILENAME)
    }

    pub fn source_filename(name: &str) -> String {
        format!("{}.py", name)
    }

    pub fn source_path(&self, name: &str) -> PathBuf {
        self.dir.join(Self::source_filename(name))
    }
}

fn unit_names(dir: &Path) -> BTreeSet<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .flatten()
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|e| module_name(&e.file_name().to_string_lossy()).map(str::to_string))
        .filter(|n| !n.starts_with('_') && !n.starts_with('~'))
        .collect()
}

fn module_name(file_name: &str) -> Option<&str> {
    for suffix in MODULE_SUFFIXES {
        let Some(stem) = file_name.strip_suffix(suffix) else {
            continue;
        };
        let name = match suffix {
            ".py" | ".pyc" => stem,
            _ => stem.split('.').next().unwrap_or(stem),
        };
        if name.is_empty() || name.contains('.') {
            return None;
        }
        return Some(name);
    }
    None
}

pub struct Inspector<'a> {
    registry: &'a AppRegistry,
    cache: HashMap<String, Option<MigrationDetails>>,
}

impl<'a> Inspector<'a> {
    pub fn new(registry: &'a AppRegistry) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
        }
    }

    /// `None` for unknown labels, apps with migrations disabled, and apps whose
    /// migrations module does not exist. `reload` bypasses the cache.
    pub fn inspect(&mut self, app_label: &str, reload: bool) -> Option<MigrationDetails> {
        if !reload {
            if let Some(cached) = self.cache.get(app_label) {
                return cached.clone();
            }
        }
        let details = self.registry.get(app_label).and_then(|app| {
            let dir = app.migrations_dir.as_ref()?;
            MigrationDetails::load(app_label, dir)
        });
        self.cache.insert(app_label.to_string(), details.clone());
        details
    }
}

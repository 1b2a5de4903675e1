use crate::domain::constants::{DEFAULT_HISTORY_TABLE, DEFAULT_MIGRATIONS_DIR};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn default_migrations_dir() -> String {
    DEFAULT_MIGRATIONS_DIR.to_string()
}

fn default_history_table() -> String {
    DEFAULT_HISTORY_TABLE.to_string()
}

fn default_formatter() -> Vec<String> {
    vec!["black".to_string(), "--fast".to_string(), "--".to_string()]
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),
    #[error("duplicate app label in settings: {0}")]
    DuplicateLabel(String),
}

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub first_party_apps: Option<Vec<String>>,
    #[serde(default)]
    pub apps: Vec<AppSettings>,
    #[serde(default)]
    pub databases: Vec<DatabaseSettings>,
    #[serde(default)]
    pub rebase: RebaseSettings,
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub label: String,
    pub path: String,
    #[serde(default = "default_migrations_dir")]
    pub migrations: String,
    #[serde(default)]
    pub skip_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub alias: String,
    pub path: String,
    #[serde(default = "default_history_table")]
    pub table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RebaseSettings {
    #[serde(default = "default_formatter")]
    pub formatter: Vec<String>,
    /// Host command that reverses an applied rebased migration.
    /// `{app}`, `{merged}` and `{rebased}` are substituted.
    #[serde(default)]
    pub unwind: Vec<String>,
}

impl Default for RebaseSettings {
    fn default() -> Self {
        Self {
            formatter: default_formatter(),
            unwind: Vec::new(),
        }
    }
}

impl Settings {
    pub fn resolve(&self, p: &str) -> PathBuf {
        self.root.join(p)
    }
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        return Err(SettingsError::NotFound(path.to_path_buf()).into());
    }
    let raw = std::fs::read_to_string(path)?;
    let mut settings: Settings = toml::from_str(&raw)?;

    let mut seen = HashSet::new();
    for app in &settings.apps {
        if !seen.insert(app.label.as_str()) {
            return Err(SettingsError::DuplicateLabel(app.label.clone()).into());
        }
    }

    settings.root = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tracing::debug!(path = %path.display(), apps = settings.apps.len(), "loaded settings");
    Ok(settings)
}

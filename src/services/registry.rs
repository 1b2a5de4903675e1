use crate::domain::constants::VENDOR_DIRS;
use crate::services::settings::Settings;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstPartyPolicy {
    AllowList(BTreeSet<String>),
    Heuristic,
}

impl FirstPartyPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        match &settings.first_party_apps {
            Some(labels) => FirstPartyPolicy::AllowList(labels.iter().cloned().collect()),
            None => FirstPartyPolicy::Heuristic,
        }
    }

    pub fn is_first_party(&self, label: &str, path: &Path) -> bool {
        match self {
            FirstPartyPolicy::AllowList(labels) => labels.contains(label),
            FirstPartyPolicy::Heuristic => !path
                .components()
                .any(|c| VENDOR_DIRS.iter().any(|v| c.as_os_str() == *v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub label: String,
    pub path: PathBuf,
    pub migrations_dir: Option<PathBuf>,
    pub first_party: bool,
}

impl AppEntry {
    pub fn new(label: &str, path: PathBuf, migrations_dir: Option<PathBuf>) -> Self {
        Self {
            label: label.to_string(),
            path,
            migrations_dir,
            first_party: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppRegistry {
    apps: Vec<AppEntry>,
    policy: FirstPartyPolicy,
}

impl AppRegistry {
    pub fn new(mut apps: Vec<AppEntry>, policy: FirstPartyPolicy) -> Self {
        apps.sort_by(|a, b| a.label.cmp(&b.label));
        let mut registry = Self { apps, policy };
        registry.classify();
        registry
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let apps = settings
            .apps
            .iter()
            .map(|a| {
                let path = settings.resolve(&a.path);
                let migrations_dir = (!a.skip_migrations).then(|| path.join(&a.migrations));
                AppEntry::new(&a.label, path, migrations_dir)
            })
            .collect();
        Self::new(apps, FirstPartyPolicy::from_settings(settings))
    }

    pub fn set_policy(&mut self, policy: FirstPartyPolicy) {
        self.policy = policy;
        self.classify();
    }

    fn classify(&mut self) {
        for app in &mut self.apps {
            app.first_party = self.policy.is_first_party(&app.label, &app.path);
        }
    }

    pub fn apps(&self) -> &[AppEntry] {
        &self.apps
    }

    pub fn first_party(&self) -> impl Iterator<Item = &AppEntry> {
        self.apps.iter().filter(|a| a.first_party)
    }

    pub fn get(&self, label: &str) -> Option<&AppEntry> {
        self.apps.iter().find(|a| a.label == label)
    }

    pub fn unknown_labels<'l>(&self, labels: &'l [String]) -> Vec<&'l str> {
        labels
            .iter()
            .filter(|l| self.get(l).is_none())
            .map(String::as_str)
            .collect()
    }
}

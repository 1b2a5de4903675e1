use serde::Serialize;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    MissingMarker,
    MultiLineMarker,
    DanglingReference,
    StaleReference,
    MultiHeadConflict,
    UnreadableMarker,
}

impl FindingKind {
    pub fn id(self) -> &'static str {
        match self {
            FindingKind::MissingMarker => "migline.E001",
            FindingKind::MultiLineMarker => "migline.E002",
            FindingKind::DanglingReference => "migline.E003",
            FindingKind::StaleReference => "migline.E004",
            FindingKind::MultiHeadConflict => "migline.E005",
            FindingKind::UnreadableMarker => "migline.E006",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub id: String,
    pub kind: FindingKind,
    pub app: Option<String>,
    pub message: String,
    pub hint: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        app: Option<&str>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            app: app.map(str::to_string),
            message: message.into(),
            hint: hint.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseReport {
    pub app: String,
    pub merged_name: String,
    pub rebased_name: String,
    pub new_name: String,
    pub old_filename: String,
    pub new_filename: String,
    pub marker_updated: bool,
}

impl RebaseReport {
    pub fn summary(&self) -> String {
        format!(
            "Renamed {} to {}, updated its dependencies, and updated max_migration.txt.",
            self.old_filename, self.new_filename
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerAction {
    pub app: String,
    pub name: String,
    pub status: String,
}

impl MarkerAction {
    pub fn message(&self) -> String {
        if self.status == "would_create" {
            format!("Would create max_migration.txt for {}.", self.app)
        } else {
            format!("Created max_migration.txt for {}.", self.app)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateMarkersReport {
    pub dry_run: bool,
    pub actions: Vec<MarkerAction>,
}

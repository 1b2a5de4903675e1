pub const MARKER_FILENAME: &str = "max_migration.txt";

pub const CONFLICT_OURS: &str = "<<<<<<<";
pub const CONFLICT_THEIRS: &str = ">>>>>>>";

pub const DEFAULT_CONFIG_FILE: &str = "migline.toml";
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";
pub const DEFAULT_HISTORY_TABLE: &str = "django_migrations";

pub const LOG_ENV: &str = "MIGLINE_LOG";

pub const VENDOR_DIRS: [&str; 2] = ["site-packages", "dist-packages"];

//! Applied-migration history stores.

use crate::services::settings::Settings;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::PathBuf;

pub trait HistoryStore {
    fn alias(&self) -> &str;
    fn is_applied(&self, app: &str, name: &str) -> anyhow::Result<bool>;
}

/// Reads the history table of a SQLite database, read-only.
///
/// A database file or table that does not exist yet means nothing is applied.
pub struct SqliteHistory {
    alias: String,
    path: PathBuf,
    table: String,
}

impl SqliteHistory {
    pub fn new(alias: &str, path: PathBuf, table: &str) -> Self {
        Self {
            alias: alias.to_string(),
            path,
            table: table.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Vec<Box<dyn HistoryStore>> {
        settings
            .databases
            .iter()
            .map(|db| {
                Box::new(SqliteHistory::new(
                    &db.alias,
                    settings.resolve(&db.path),
                    &db.table,
                )) as Box<dyn HistoryStore>
            })
            .collect()
    }
}

impl HistoryStore for SqliteHistory {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn is_applied(&self, app: &str, name: &str) -> anyhow::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let has_table = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![self.table],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !has_table {
            return Ok(false);
        }
        let sql = format!(
            "SELECT 1 FROM \"{}\" WHERE app = ?1 AND name = ?2 LIMIT 1",
            self.table.replace('"', "\"\"")
        );
        let applied = conn
            .query_row(&sql, params![app, name], |_| Ok(()))
            .optional()?
            .is_some();
        Ok(applied)
    }
}

pub fn migration_applied(stores: &[Box<dyn HistoryStore>], app: &str, name: &str) -> bool {
    stores.iter().any(|store| match store.is_applied(app, name) {
        Ok(applied) => applied,
        Err(e) => {
            tracing::warn!(alias = store.alias(), error = %e, "could not read migration history");
            false
        }
    })
}

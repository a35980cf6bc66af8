//! `SQLite` settings storage.
//!
//! Entries are string-valued and grouped by namespace so several
//! applications (or test cases) can share one database file.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, trace};

use super::ConfigBackend;
use crate::error::{GrabError, Result};

/// SQLite schema for settings storage.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
);
";

fn db_error(context: &str, e: &rusqlite::Error) -> GrabError {
    GrabError::ConfigStore(format!("{context}: {e}"))
}

/// Settings backend stored in an `SQLite` database.
pub struct SqliteBackend {
    conn: Connection,
    namespace: String,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Opens or creates the database at the default location.
    #[instrument]
    pub fn open_default(namespace: &str) -> Result<Self> {
        let path = super::default_db_path()?;
        Self::open(&path, namespace)
    }

    /// Opens or creates a database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), namespace))]
    pub fn open<P: AsRef<Path>>(path: P, namespace: &str) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "Opening settings database");
        let conn =
            Connection::open(path).map_err(|e| db_error("Failed to open settings database", &e))?;

        let db = Self {
            conn,
            namespace: namespace.to_string(),
            path: Some(path.to_path_buf()),
        };
        db.init_schema()?;
        info!(path = %path.display(), "Settings database ready");
        Ok(db)
    }

    /// Creates an in-memory database (useful for testing).
    pub fn in_memory(namespace: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| db_error("Failed to create in-memory database", &e))?;

        let db = Self {
            conn,
            namespace: namespace.to_string(),
            path: None,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| db_error("Failed to initialize schema", &e))
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ConfigBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM entries WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| db_error("Failed to read setting", &e))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        trace!(key, "Writing setting");
        self.conn
            .execute(
                "INSERT INTO entries (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
                params![self.namespace, key, value],
            )
            .map_err(|e| db_error("Failed to write setting", &e))?;
        Ok(())
    }

    fn write_all(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| db_error("Failed to start transaction", &e))?;

        for (key, value) in entries {
            tx.execute(
                "INSERT INTO entries (namespace, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
                params![self.namespace, key, value],
            )
            .map_err(|e| db_error("Failed to write setting", &e))?;
        }

        tx.commit()
            .map_err(|e| db_error("Failed to commit transaction", &e))?;
        debug!(count = entries.len(), "Settings written");
        Ok(())
    }
}

//! Dropbox folder discovery.
//!
//! The Dropbox client keeps its settings in an `SQLite` database in the
//! per-user application data directory. Older clients wrote `dropbox.db`
//! with base64-encoded pickled values; newer ones write `config.db`, where
//! the value may be plain text. The first database that exists is queried
//! for `dropbox_path`; if nothing usable comes back, `~/Dropbox` is used
//! when it exists.
//!
//! # Usage
//!
//! ```ignore
//! use screengrab::sync_folder::{SyncFolderLocator, public_folder};
//!
//! let root = SyncFolderLocator::from_environment().resolve()?;
//! let public = public_folder(&root);
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde_pickle::DeOptions;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{GrabError, Result};

/// Database file names, tried in this order.
pub const DATABASE_FILES: [&str; 2] = ["config.db", "dropbox.db"];

/// Config table key holding the folder path.
const PATH_KEY: &str = "dropbox_path";

/// Name of the web-accessible subtree.
pub const PUBLIC_DIR: &str = "Public";

static RESOLVED: OnceLock<PathBuf> = OnceLock::new();

/// Returns `<root>/Public`.
pub fn public_folder(root: &Path) -> PathBuf {
    root.join(PUBLIC_DIR)
}

/// Locates the Dropbox folder from a client data directory and a home directory.
#[derive(Debug, Clone)]
pub struct SyncFolderLocator {
    data_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl SyncFolderLocator {
    pub fn new(data_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            home_dir: Some(home_dir.into()),
        }
    }

    /// Locator for the current user.
    ///
    /// The client data directory is `%APPDATA%\Dropbox` on Windows and
    /// `~/.dropbox` elsewhere.
    pub fn from_environment() -> Self {
        let home_dir = dirs::home_dir();
        let data_dir = if cfg!(windows) {
            dirs::config_dir().map(|d| d.join("Dropbox"))
        } else {
            home_dir.as_ref().map(|h| h.join(".dropbox"))
        };
        Self { data_dir, home_dir }
    }

    /// Candidate database paths in lookup order.
    pub fn database_candidates(&self) -> Vec<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| DATABASE_FILES.iter().map(|name| dir.join(name)).collect())
            .unwrap_or_default()
    }

    /// Default folder used when no database yields a path.
    pub fn fallback_dir(&self) -> Option<PathBuf> {
        self.home_dir.as_ref().map(|h| h.join("Dropbox"))
    }

    /// Resolves the Dropbox folder without caching.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<PathBuf> {
        let candidates = self.database_candidates();

        if let Some(db_path) = candidates.iter().find(|p| p.is_file()) {
            match read_database_path(db_path) {
                Ok(Some(path)) => {
                    info!(db = %db_path.display(), path = %path.display(), "Found Dropbox folder");
                    return Ok(path);
                }
                Ok(None) => debug!(db = %db_path.display(), "Database has no dropbox_path entry"),
                Err(e) => warn!(db = %db_path.display(), error = %e, "Could not read Dropbox database"),
            }
        } else {
            debug!("No Dropbox database found");
        }

        let fallback = self.fallback_dir();
        if let Some(dir) = fallback.as_ref().filter(|d| d.is_dir()) {
            info!(path = %dir.display(), "Using default Dropbox folder");
            return Ok(dir.clone());
        }

        let searched = candidates
            .iter()
            .chain(fallback.iter())
            .map(|p| p.display().to_string())
            .collect();
        Err(GrabError::SyncFolderNotFound { searched })
    }
}

/// Resolves the Dropbox folder once per process.
///
/// Failures are not cached; a later call retries discovery.
pub fn resolve_cached(locator: &SyncFolderLocator) -> Result<&'static Path> {
    if let Some(path) = RESOLVED.get() {
        return Ok(path);
    }
    let path = locator.resolve()?;
    Ok(RESOLVED.get_or_init(|| path))
}

/// Reads `dropbox_path` from a client database.
///
/// Returns `Ok(None)` when the row is missing or empty.
pub fn read_database_path(db_path: &Path) -> Result<Option<PathBuf>> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| GrabError::ConfigStore(format!("Failed to open {}: {e}", db_path.display())))?;

    let value: Option<Value> = conn
        .query_row(
            "SELECT value FROM config WHERE key = ?1",
            [PATH_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| GrabError::ConfigStore(format!("Failed to query {}: {e}", db_path.display())))?;

    let raw = match value {
        Some(Value::Text(text)) => text,
        Some(Value::Blob(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Some(other) => {
            trace!(?other, "Unexpected dropbox_path value type");
            return Ok(None);
        }
        None => return Ok(None),
    };

    let decoded = decode_path_value(&raw);
    Ok((!decoded.is_empty()).then(|| PathBuf::from(decoded)))
}

/// Decodes a stored path: base64 of a pickled string, or plain text.
pub fn decode_path_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(path) = STANDARD
        .decode(trimmed)
        .ok()
        .and_then(|bytes| unpickle_string(&bytes))
    {
        trace!("Decoded pickled dropbox_path");
        return path;
    }
    trim_line_endings(trimmed).to_string()
}

fn trim_line_endings(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}

/// Extracts a single string from a pickle stream (any protocol).
///
/// Python 2 byte strings are decoded as UTF-8 text.
fn unpickle_string(bytes: &[u8]) -> Option<String> {
    serde_pickle::from_slice(bytes, DeOptions::new().decode_strings())
        .map_err(|e| trace!(error = %e, "Value is not a pickled string"))
        .ok()
}

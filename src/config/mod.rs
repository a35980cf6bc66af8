//! Persistent settings store.
//!
//! Settings live in a per-application namespace of string entries. The
//! default backend is an `SQLite` file under the platform config directory;
//! an in-memory backend serves tests and dry runs.
//!
//! # Location
//!
//! ```text
//! <config_dir>/screengrab/settings.db   # entries(namespace, key, value)
//! ```

mod db;
mod memory;
mod path;
mod store;

use std::path::PathBuf;

pub use db::SqliteBackend;
pub use memory::MemoryBackend;
pub use path::relative_save_directory;
pub use store::ConfigStore;

use crate::error::{GrabError, Result};

/// Namespace under which settings are stored.
pub const NAMESPACE: &str = "dropbox_screen_grabber";

/// Key/value storage behind [`ConfigStore`].
pub trait ConfigBackend {
    /// Reads one entry; `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Writes one entry, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Writes several entries.
    fn write_all(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }
}

/// Returns the default settings database path.
///
/// Location: `<config_dir>/screengrab/settings.db`
pub fn default_db_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        GrabError::ConfigStore("Could not determine config directory".to_string())
    })?;
    Ok(config_dir.join("screengrab").join("settings.db"))
}

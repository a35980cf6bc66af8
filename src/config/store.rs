//! Load and save the settings record through a [`ConfigBackend`].

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, instrument};

use super::ConfigBackend;
use super::path::relative_save_directory;
use crate::error::Result;
use crate::settings::{KEYS, Settings};

/// Reads and writes [`Settings`] in a backend namespace.
pub struct ConfigStore<B> {
    backend: B,
}

impl<B: ConfigBackend> ConfigStore<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads settings; absent or malformed entries take their defaults.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Settings> {
        let mut stored = HashMap::new();
        for key in KEYS {
            if let Some(value) = self.backend.read(key)? {
                stored.insert(key, value);
            }
        }
        debug!(found = stored.len(), total = KEYS.len(), "Loaded stored settings");
        Ok(Settings::from_entries(|key| stored.remove(key)))
    }

    /// Persists every setting.
    ///
    /// The save directory is re-derived relative to `public_root` first, so
    /// an absolute directory outside the Public folder is stored as empty.
    /// A record that would not load back unchanged is rejected with
    /// `InvalidSetting` and nothing is written.
    #[instrument(skip(self, settings, public_root))]
    pub fn save(&mut self, settings: &Settings, public_root: &Path) -> Result<()> {
        let mut record = settings.clone();
        record.screenshot_save_directory =
            relative_save_directory(&settings.screenshot_save_directory, public_root);
        record.validate()?;

        let entries = record.to_entries();
        self.backend.write_all(&entries)?;
        info!(count = entries.len(), "Settings saved");
        Ok(())
    }

    /// Persists the default value of every setting.
    pub fn reset(&mut self, public_root: &Path) -> Result<()> {
        self.save(&Settings::default(), public_root)
    }
}

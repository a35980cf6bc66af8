//! In-memory settings backend.

use std::collections::HashMap;

use super::ConfigBackend;
use crate::error::Result;

/// Settings backend kept in a `HashMap`; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry, as if written by an earlier session.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }
}

impl ConfigBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

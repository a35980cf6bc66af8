//! Test fixture helpers for creating temporary test data.
//!
//! [`DropboxFixture`] lays out a throwaway home directory:
//!
//! ```text
//! <home>/
//!   Dropbox/Public/        sync folder with its Public subtree
//!   .dropbox/config.db     client database (on request)
//!   settings.db            settings store path
//! ```

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{Rgba, RgbaImage};
use rusqlite::Connection;
use screengrab::sync_folder::SyncFolderLocator;
use tempfile::TempDir;

/// A temporary home directory with a Dropbox folder.
pub struct DropboxFixture {
    pub home: TempDir,
}

impl DropboxFixture {
    /// Home with `Dropbox/Public` created.
    ///
    /// # Panics
    ///
    /// Panics if the directories cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let fixture = Self::empty();
        std::fs::create_dir_all(fixture.public()).expect("Failed to create Public folder");
        fixture
    }

    /// Home with nothing in it.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    #[must_use]
    pub fn sync_root(&self) -> PathBuf {
        self.home().join("Dropbox")
    }

    #[must_use]
    pub fn public(&self) -> PathBuf {
        self.sync_root().join("Public")
    }

    #[must_use]
    pub fn client_data_dir(&self) -> PathBuf {
        self.home().join(".dropbox")
    }

    #[must_use]
    pub fn settings_db(&self) -> PathBuf {
        self.home().join("settings.db")
    }

    #[must_use]
    pub fn locator(&self) -> SyncFolderLocator {
        SyncFolderLocator::new(self.client_data_dir(), self.home())
    }

    /// Writes a client database with an optional `dropbox_path` value.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be written.
    pub fn write_client_db(&self, file_name: &str, dropbox_path: Option<&str>) -> PathBuf {
        let dir = self.client_data_dir();
        std::fs::create_dir_all(&dir).expect("Failed to create client data dir");
        let path = dir.join(file_name);

        let conn = Connection::open(&path).expect("Failed to create client database");
        conn.execute_batch("CREATE TABLE config (key TEXT PRIMARY KEY, value TEXT)")
            .expect("Failed to create config table");
        if let Some(value) = dropbox_path {
            conn.execute(
                "INSERT INTO config (key, value) VALUES ('dropbox_path', ?1)",
                [value],
            )
            .expect("Failed to insert dropbox_path");
        }
        path
    }
}

impl Default for DropboxFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Base64 of a protocol 0 pickle of an ASCII string.
#[must_use]
pub fn pickled_v0(value: &str) -> String {
    STANDARD.encode(format!("V{value}\np1\n."))
}

/// Base64 of a protocol 2 pickle of a string.
#[must_use]
pub fn pickled_v2(value: &str) -> String {
    let mut bytes = vec![0x80, 2, b'X'];
    let len = u32::try_from(value.len()).expect("string too long");
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(value.as_bytes());
    bytes.extend_from_slice(b"q\x00.");
    STANDARD.encode(bytes)
}

/// A two-tone test image so crops and resizes are visible.
#[must_use]
pub fn test_screen(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    })
}

//! Path rules for the save-directory setting.
//!
//! Only paths relative to the Public folder are persisted. Absolute paths
//! inside the Public folder are rewritten as relative; anything else is
//! cleared.

use std::path::{Component, Path};

use tracing::{debug, warn};

/// Re-derives a save directory as relative to `public_root`, or blank.
///
/// Rules:
/// 1. Empty stays empty
/// 2. Absolute paths under `public_root`: the remainder below the root
/// 3. Absolute paths elsewhere, or the root itself: empty
/// 4. Relative paths: kept unless they climb out with `..`
pub fn relative_save_directory(value: &str, public_root: &Path) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    let path = Path::new(value);
    let anchored = path
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)));

    if anchored {
        if public_root.as_os_str().is_empty() {
            warn!(directory = value, "Public folder unknown, clearing absolute save directory");
            return String::new();
        }
        return match path.strip_prefix(public_root) {
            Ok(rest) if !rest.as_os_str().is_empty() => {
                let relative = rest.to_string_lossy().into_owned();
                debug!(
                    original = value,
                    relative = %relative,
                    "Rewrote save directory relative to Public folder"
                );
                relative
            }
            _ => {
                warn!(
                    directory = value,
                    public_root = %public_root.display(),
                    "Save directory is outside the Public folder, clearing it"
                );
                String::new()
            }
        };
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        warn!(directory = value, "Save directory escapes the Public folder, clearing it");
        return String::new();
    }

    value.to_string()
}

//! Error types for screengrab operations.

use thiserror::Error;

/// Primary error type for capture, export and publish operations.
#[derive(Error, Debug)]
pub enum GrabError {
    // Sync folder errors
    #[error("Dropbox folder not found (searched: {})", searched.join(", "))]
    SyncFolderNotFound { searched: Vec<String> },

    // Capture errors
    #[error("No foreground window to capture")]
    NoForegroundWindow,

    #[error("Foreground window is minimized")]
    WindowMinimized,

    #[error("Screen capture failed: {0}")]
    Capture(String),

    // Export errors
    #[error("Image encoding failed: {0}")]
    ImageEncoding(String),

    // Publish errors
    #[error("Clipboard access failed: {0}")]
    Clipboard(String),

    // Network errors
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Invalid update document: {0}")]
    UpdateParse(String),

    // Configuration errors
    #[error("Settings store error: {0}")]
    ConfigStore(String),

    #[error("Invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown setting: {key}")]
    UnknownSetting { key: String },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GrabError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SyncFolderNotFound { .. }
                | Self::NoForegroundWindow
                | Self::WindowMinimized
                | Self::InvalidSetting { .. }
                | Self::UnknownSetting { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::SyncFolderNotFound { .. } => {
                Some("Install the Dropbox client or pass --sync-folder <PATH>")
            }
            Self::NoForegroundWindow | Self::WindowMinimized => {
                Some("Focus the window to capture, or grab the full screen")
            }
            Self::UnknownSetting { .. } => Some("Run: screengrab config show"),
            Self::Io(_) => Some("Check that the save directory exists and is writable"),
            _ => None,
        }
    }
}

impl From<image::ImageError> for GrabError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::ImageEncoding(other.to_string()),
        }
    }
}

/// Convenience type alias for Results using GrabError.
pub type Result<T> = std::result::Result<T, GrabError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| GrabError::Other(format!("{}: {e}", f().into())))
    }
}

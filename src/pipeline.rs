//! Capture → export → publish, as invoked by a caller such as the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::capture::{self, ScreenSource};
use crate::error::Result;
use crate::export;
use crate::publish::{ClipboardPublisher, ClipboardSink, Shortener};
use crate::settings::{AutoGrabType, Settings};

/// What a single grab should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabRequest {
    pub full_screen: bool,
    /// Per-call switch; the URL is copied only if settings allow it too.
    pub copy_url: bool,
}

impl GrabRequest {
    pub const fn full_screen() -> Self {
        Self {
            full_screen: true,
            copy_url: true,
        }
    }

    pub const fn active_window() -> Self {
        Self {
            full_screen: false,
            copy_url: true,
        }
    }

    pub const fn for_auto_grab(kind: AutoGrabType) -> Self {
        Self {
            full_screen: kind.is_full_screen(),
            copy_url: true,
        }
    }
}

/// Result of one grab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFile {
    pub file_name: String,
    pub save_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

/// Captures, exports and optionally publishes one screenshot.
#[instrument(skip(source, publisher, settings, sync_root))]
pub fn grab<Src, C, S>(
    source: &Src,
    publisher: &mut ClipboardPublisher<C, S>,
    settings: &Settings,
    sync_root: &Path,
    request: GrabRequest,
) -> Result<PublishedFile>
where
    Src: ScreenSource + ?Sized,
    C: ClipboardSink,
    S: Shortener,
{
    let image = capture::capture(source, request.full_screen)?;
    let file_name = export::export(image, settings, sync_root)?;
    let save_path = export::save_directory(sync_root, settings).join(&file_name);

    let public_url = if request.copy_url {
        publisher.publish(&settings.user_id, &file_name, settings)?
    } else {
        None
    };

    Ok(PublishedFile {
        file_name,
        save_path,
        public_url,
    })
}

/// Outcome counts of an auto-grab run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutoGrabSummary {
    pub succeeded: u64,
    pub failed: u64,
}

/// Runs `grab_once` every `interval`, `count` times or forever.
///
/// A failed iteration is logged and the loop continues. `sleep` is called
/// between iterations, never after the last one. `Some(0)` grabs nothing.
pub fn run_auto_grab<G, W>(
    interval: Duration,
    count: Option<u64>,
    mut sleep: W,
    mut grab_once: G,
) -> AutoGrabSummary
where
    G: FnMut(u64) -> Result<PublishedFile>,
    W: FnMut(Duration),
{
    let mut summary = AutoGrabSummary::default();
    let mut iteration = 0;

    loop {
        if count.is_some_and(|limit| iteration >= limit) {
            break;
        }
        if iteration > 0 {
            sleep(interval);
        }

        iteration += 1;
        match grab_once(iteration) {
            Ok(file) => {
                summary.succeeded += 1;
                info!(iteration, file = %file.file_name, "Auto-grab saved screenshot");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(iteration, error = %e, "Auto-grab failed");
            }
        }
    }

    summary
}

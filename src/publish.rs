//! Public URL construction, shortening and clipboard delivery.

use std::time::Duration;
#[cfg(target_os = "linux")]
use std::time::Instant;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{debug, info, instrument, warn};

use crate::error::{GrabError, Result};
use crate::settings::Settings;

/// Host serving files under the Public folder.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://dl.getdropbox.com";

/// URL shortening endpoint; the long URL goes in `longurl`.
pub const SHORTEN_ENDPOINT: &str = "http://is.gd/api.php";

/// Substring every valid short URL contains.
pub const SHORT_URL_MARKER: &str = "is.gd/";

/// Timeout for the shortening request.
pub const SHORTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the clipboard owner stays alive after a write on X11/Wayland.
pub const CLIPBOARD_HOLD: Duration = Duration::from_secs(10);

/// Characters escaped in the path segments of a public URL. `/` separates
/// segments and is kept.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the public URL of a file in the Public folder.
///
/// `<base>/u/<user_id>/<dir>/<file_name>`, or without `<dir>` when the save
/// directory is empty. Backslashes in the directory become `/`; spaces and
/// URL delimiters in the directory and file name are percent-escaped.
pub fn public_url(base_url: &str, user_id: &str, save_directory: &str, file_name: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let directory = save_directory.replace('\\', "/");
    let directory = directory.trim_matches('/');
    let file_name = utf8_percent_encode(file_name, PATH_ESCAPES);

    if directory.is_empty() {
        format!("{base}/u/{user_id}/{file_name}")
    } else {
        let directory = utf8_percent_encode(directory, PATH_ESCAPES);
        format!("{base}/u/{user_id}/{directory}/{file_name}")
    }
}

/// Turns a long URL into a short one.
pub trait Shortener {
    fn shorten(&self, long_url: &str) -> Result<String>;
}

/// Shortener calling the is.gd API over HTTP.
pub struct HttpShortener {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpShortener {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(SHORTEN_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(SHORTEN_TIMEOUT)
            .build()
            .map_err(|e| GrabError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Shortener for HttpShortener {
    #[instrument(skip(self))]
    fn shorten(&self, long_url: &str) -> Result<String> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("longurl", long_url)])
            .send()
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| GrabError::Network(e.to_string()))?;

        let candidate = body.trim();
        if candidate.contains(SHORT_URL_MARKER) {
            Ok(candidate.to_string())
        } else {
            Err(GrabError::Network(format!(
                "unexpected shortener response: {}",
                candidate.chars().take(80).collect::<String>()
            )))
        }
    }
}

/// Shortens `long_url`, keeping it unchanged on any failure.
pub fn shorten_or_keep<S: Shortener + ?Sized>(shortener: &S, long_url: &str) -> String {
    match shortener.shorten(long_url) {
        Ok(short) => {
            debug!(short = %short, "Shortened URL");
            short
        }
        Err(e) => {
            warn!(error = %e, "URL shortening failed, using the long URL");
            long_url.to_string()
        }
    }
}

/// Exclusive, scoped access to the system clipboard.
///
/// Implementations acquire the clipboard in [`ClipboardSink::set_text`] and
/// release it before returning, whether or not the write succeeded.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via `arboard`.
///
/// On X11 and Wayland the text is served by the process that set it, so a
/// write blocks for up to `hold` (or until another application takes the
/// selection) to keep the URL pasteable after a one-shot command exits.
#[derive(Debug, Default)]
pub struct SystemClipboard {
    hold: Duration,
}

impl SystemClipboard {
    /// Clipboard that returns as soon as the text is set.
    pub const fn new() -> Self {
        Self {
            hold: Duration::ZERO,
        }
    }

    /// Clipboard that keeps ownership for up to `hold` after each write.
    pub const fn holding(hold: Duration) -> Self {
        Self { hold }
    }

    pub const fn hold(&self) -> Duration {
        self.hold
    }

    #[cfg(target_os = "linux")]
    fn write_text(&self, clipboard: &mut arboard::Clipboard, text: &str) -> Result<()> {
        use arboard::SetExtLinux;

        if self.hold.is_zero() {
            return clipboard
                .set_text(text)
                .map_err(|e| GrabError::Clipboard(e.to_string()));
        }
        debug!(hold_ms = self.hold.as_millis(), "Holding clipboard ownership");
        clipboard
            .set()
            .wait_until(Instant::now() + self.hold)
            .text(text)
            .map_err(|e| GrabError::Clipboard(e.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn write_text(&self, clipboard: &mut arboard::Clipboard, text: &str) -> Result<()> {
        clipboard
            .set_text(text)
            .map_err(|e| GrabError::Clipboard(e.to_string()))
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        // Dropping the handle releases ownership, including on the error paths.
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| GrabError::Clipboard(e.to_string()))?;
        clipboard
            .clear()
            .map_err(|e| GrabError::Clipboard(e.to_string()))?;
        self.write_text(&mut clipboard, text)
    }
}

/// Puts public URLs of exported files on the clipboard.
pub struct ClipboardPublisher<C, S> {
    clipboard: C,
    shortener: S,
    base_url: String,
}

impl<C: ClipboardSink, S: Shortener> ClipboardPublisher<C, S> {
    pub fn new(clipboard: C, shortener: S) -> Self {
        Self {
            clipboard,
            shortener,
            base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub const fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Places the URL of `file_name` on the clipboard and returns it.
    ///
    /// Does nothing (returns `None`) unless URL copying is enabled and
    /// `user_id` is non-empty. Shortening failures fall back to the long URL.
    #[instrument(skip(self, settings))]
    pub fn publish(
        &mut self,
        user_id: &str,
        file_name: &str,
        settings: &Settings,
    ) -> Result<Option<String>> {
        if !settings.copy_url_to_clipboard || user_id.is_empty() {
            debug!("URL copy disabled or no user id, skipping");
            return Ok(None);
        }

        let long_url = public_url(
            &self.base_url,
            user_id,
            &settings.screenshot_save_directory,
            file_name,
        );
        let url = if settings.shorten_urls {
            shorten_or_keep(&self.shortener, &long_url)
        } else {
            long_url
        };

        self.clipboard.set_text(&url)?;
        info!(url = %url, "Copied URL to clipboard");
        Ok(Some(url))
    }
}

//! Update check against the published version document.
//!
//! The document is a small XML file:
//!
//! ```xml
//! <latest>
//!   <version>0.3.1</version>
//!   <release-date>2009-06-01</release-date>
//!   <url-download>http://example.com/screengrab-0.3.1.zip</url-download>
//! </latest>
//! ```

use std::cmp::Ordering;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{GrabError, Result};

/// Location of the version document.
pub const UPDATE_CHECK_URL: &str =
    "http://dl.getdropbox.com/u/521887/dropbox_screen_grabber/latest";

/// User agent sent with the update request.
pub const USER_AGENT: &str = "Rust Client - Dropbox Screen Grabber";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields of the version document; each is `None` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatestVersion {
    pub version: Option<String>,
    pub release_date: Option<String>,
    pub download_url: Option<String>,
}

impl LatestVersion {
    /// True when the advertised version is newer than `current`.
    pub fn is_newer_than(&self, current: &str) -> bool {
        self.version
            .as_deref()
            .is_some_and(|latest| compare_versions(latest, current) == Ordering::Greater)
    }
}

/// Compares dotted versions numerically; non-numeric parts count as 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            a.get(i)
                .copied()
                .unwrap_or(0)
                .cmp(&b.get(i).copied().unwrap_or(0))
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Extracts the version fields from the top two levels of the document.
pub fn parse_version_document(xml: &str) -> Result<LatestVersion> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| GrabError::UpdateParse(e.to_string()))?;

    let mut latest = LatestVersion::default();
    for top in doc.root().children() {
        for node in top.children().filter(roxmltree::Node::is_element) {
            let Some(text) = node.text().map(str::trim) else {
                continue;
            };
            let slot = match node.tag_name().name() {
                "version" => &mut latest.version,
                "release-date" => &mut latest.release_date,
                "url-download" => &mut latest.download_url,
                _ => continue,
            };
            *slot = Some(text.to_string());
        }
    }
    debug!(?latest, "Parsed version document");
    Ok(latest)
}

/// Fetches version documents over HTTP.
pub struct UpdateChecker {
    client: reqwest::blocking::Client,
    url: String,
}

impl UpdateChecker {
    pub fn new() -> Result<Self> {
        Self::with_url(UPDATE_CHECK_URL)
    }

    pub fn with_url(url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GrabError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Downloads and parses the version document.
    #[instrument(skip(self), fields(url = %self.url))]
    pub fn check_latest(&self) -> Result<LatestVersion> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| GrabError::Network(e.to_string()))?;

        let latest = parse_version_document(&body)?;
        info!(version = ?latest.version, "Update check complete");
        Ok(latest)
    }
}

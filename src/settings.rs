//! Typed settings record.
//!
//! Every option has a default and a string encoding used by the settings
//! store. Booleans are stored as `"0"`/`"1"`, enumerations by their
//! human-readable label. Parsing a stored value is strict in [`Settings::set`]
//! and forgiving in [`Settings::from_entries`], where malformed values fall
//! back to the field default.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{trace, warn};

use crate::error::{GrabError, Result};

/// Persisted setting names, in storage order.
pub const KEYS: [&str; 17] = [
    "user_id",
    "copy_url_to_clipboard",
    "shorten_urls",
    "enable_toast_notifications",
    "image_format",
    "image_quality",
    "filename_prefix",
    "screenshot_save_directory",
    "hot_key1_modifier",
    "hot_key1_key_code",
    "hot_key2_modifier",
    "hot_key2_key_code",
    "resize_image",
    "resize_value",
    "auto_grab",
    "auto_grab_type",
    "auto_grab_interval",
];

/// Name of the save-directory entry, which is re-derived on save.
pub const SAVE_DIRECTORY_KEY: &str = "screenshot_save_directory";

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> GrabError {
    GrabError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Output image encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// File extension written for this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(Self::Png),
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            _ => Err("expected PNG or JPEG".to_string()),
        }
    }
}

/// JPEG quality tiers, from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageQuality {
    VeryLow,
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
    VeryHigh,
    Maximum,
}

impl ImageQuality {
    pub const ALL: [Self; 8] = [
        Self::VeryLow,
        Self::Low,
        Self::MediumLow,
        Self::Medium,
        Self::MediumHigh,
        Self::High,
        Self::VeryHigh,
        Self::Maximum,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::MediumLow => "Medium Low",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium High",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Maximum => "Maximum",
        }
    }

    /// Encoder quality (30-100) for this tier.
    pub const fn jpeg_quality(self) -> u8 {
        match self {
            Self::VeryLow => 30,
            Self::Low => 40,
            Self::MediumLow => 50,
            Self::Medium => 60,
            Self::MediumHigh => 70,
            Self::High => 80,
            Self::VeryHigh => 90,
            Self::Maximum => 100,
        }
    }

    /// Look up a tier by its label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.label().eq_ignore_ascii_case(label))
    }
}

/// Encoder quality for a stored label; unrecognized labels map to 100.
pub fn jpeg_quality_for_label(label: &str) -> u8 {
    ImageQuality::from_label(label).map_or(100, ImageQuality::jpeg_quality)
}

/// Hotkey modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
}

impl Modifier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
        }
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Ok(Self::Ctrl),
            "alt" => Ok(Self::Alt),
            "shift" => Ok(Self::Shift),
            _ => Err("expected Ctrl, Alt or Shift".to_string()),
        }
    }
}

/// Hotkey function key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    F10,
    F11,
    F12,
}

impl KeyCode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
        }
    }
}

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F10" => Ok(Self::F10),
            "F11" => Ok(Self::F11),
            "F12" => Ok(Self::F12),
            _ => Err("expected F10, F11 or F12".to_string()),
        }
    }
}

/// A modifier + function key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotKey {
    pub modifier: Modifier,
    pub key_code: KeyCode,
}

impl fmt::Display for HotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.modifier.label(), self.key_code.label())
    }
}

/// Resize factor, stored as `"NN%"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePercent(u32);

impl ResizePercent {
    /// Creates a percentage in `1..=100`.
    pub fn new(percent: u32) -> Option<Self> {
        (1..=100).contains(&percent).then_some(Self(percent))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Scale one dimension, truncating and never going below one pixel.
    pub fn scale(self, dimension: u32) -> u32 {
        let scaled = u64::from(dimension) * u64::from(self.0) / 100;
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }
}

impl Default for ResizePercent {
    fn default() -> Self {
        Self(95)
    }
}

impl fmt::Display for ResizePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for ResizePercent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('%').trim();
        let percent: u32 = digits
            .parse()
            .map_err(|_| "expected a percentage such as 95%".to_string())?;
        Self::new(percent).ok_or_else(|| "percentage must be between 1% and 100%".to_string())
    }
}

/// What the auto-grab timer captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoGrabType {
    #[default]
    FullScreen,
    ActiveWindow,
}

impl AutoGrabType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullScreen => "Full screen",
            Self::ActiveWindow => "Active window",
        }
    }

    pub const fn is_full_screen(self) -> bool {
        matches!(self, Self::FullScreen)
    }
}

impl FromStr for AutoGrabType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full screen" => Ok(Self::FullScreen),
            "active window" => Ok(Self::ActiveWindow),
            _ => Err("expected 'Full screen' or 'Active window'".to_string()),
        }
    }
}

/// Auto-grab interval, stored as `"<N> minutes"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabInterval {
    minutes: u32,
}

impl GrabInterval {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self { minutes })
    }

    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    pub const fn as_millis(self) -> u64 {
        self.minutes as u64 * 60 * 1000
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }
}

impl Default for GrabInterval {
    fn default() -> Self {
        Self { minutes: 60 }
    }
}

impl fmt::Display for GrabInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} minutes", self.minutes)
    }
}

impl FromStr for GrabInterval {
    type Err = String;

    /// Only the leading number is significant; the unit is always minutes.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let number = s.split_whitespace().next().unwrap_or_default();
        let minutes: u32 = number
            .parse()
            .map_err(|_| "expected an interval such as '60 minutes'".to_string())?;
        Self::from_minutes(minutes).ok_or_else(|| "interval must be at least 1 minute".to_string())
    }
}

/// Parses an interval label like `"15 minutes"` into milliseconds.
pub fn interval_ms(label: &str) -> Result<u64> {
    label
        .parse::<GrabInterval>()
        .map(GrabInterval::as_millis)
        .map_err(|reason| invalid("auto_grab_interval", label, reason))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, value, "expected 0 or 1")),
    }
}

const fn encode_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn parse_with<T: FromStr<Err = String>>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|reason| invalid(key, value, reason))
}

/// Complete settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_id: String,
    pub copy_url_to_clipboard: bool,
    pub shorten_urls: bool,
    pub enable_toast_notifications: bool,
    pub image_format: ImageFormat,
    /// Quality label, kept verbatim; interpreted by [`jpeg_quality_for_label`].
    pub image_quality: String,
    pub filename_prefix: String,
    /// Directory relative to the Public folder; empty means the Public root.
    pub screenshot_save_directory: String,
    pub hot_key1: HotKey,
    pub hot_key2: HotKey,
    pub resize_image: bool,
    pub resize_value: ResizePercent,
    pub auto_grab: bool,
    pub auto_grab_type: AutoGrabType,
    pub auto_grab_interval: GrabInterval,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            copy_url_to_clipboard: false,
            shorten_urls: false,
            enable_toast_notifications: true,
            image_format: ImageFormat::Png,
            image_quality: ImageQuality::VeryHigh.label().to_string(),
            filename_prefix: "screengrab".to_string(),
            screenshot_save_directory: String::new(),
            hot_key1: HotKey {
                modifier: Modifier::Shift,
                key_code: KeyCode::F10,
            },
            hot_key2: HotKey {
                modifier: Modifier::Shift,
                key_code: KeyCode::F11,
            },
            resize_image: false,
            resize_value: ResizePercent::default(),
            auto_grab: false,
            auto_grab_type: AutoGrabType::FullScreen,
            auto_grab_interval: GrabInterval::default(),
        }
    }
}

impl Settings {
    /// Builds settings from stored entries.
    ///
    /// Missing entries take their default. Malformed entries are logged and
    /// take their default. Keys not in [`KEYS`] are never consulted.
    pub fn from_entries<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        for key in KEYS {
            let Some(value) = lookup(key) else {
                trace!(key, "Setting absent, using default");
                continue;
            };
            if let Err(e) = settings.set(key, &value) {
                warn!(key, value = %value, error = %e, "Ignoring malformed setting");
            }
        }
        settings
    }

    /// Encodes every setting as `(key, value)` in [`KEYS`] order.
    pub fn to_entries(&self) -> Vec<(&'static str, String)> {
        KEYS.into_iter()
            .map(|key| (key, self.encode(key)))
            .collect()
    }

    /// Checks that every field reloads unchanged from its stored encoding.
    ///
    /// Catches values assigned directly to the public fields that `set`
    /// would reject or normalise, such as an empty prefix or a padded
    /// user id.
    pub fn validate(&self) -> Result<()> {
        let mut reloaded = Self::default();
        for (key, value) in self.to_entries() {
            reloaded.set(key, &value)?;
            if reloaded.encode(key) != value {
                return Err(invalid(key, &value, "value does not load back unchanged"));
            }
        }
        Ok(())
    }

    /// Returns the stored encoding of one setting.
    pub fn get(&self, key: &str) -> Result<String> {
        if KEYS.contains(&key) {
            Ok(self.encode(key))
        } else {
            Err(GrabError::UnknownSetting {
                key: key.to_string(),
            })
        }
    }

    fn encode(&self, key: &str) -> String {
        match key {
            "user_id" => self.user_id.clone(),
            "copy_url_to_clipboard" => encode_bool(self.copy_url_to_clipboard).to_string(),
            "shorten_urls" => encode_bool(self.shorten_urls).to_string(),
            "enable_toast_notifications" => {
                encode_bool(self.enable_toast_notifications).to_string()
            }
            "image_format" => self.image_format.label().to_string(),
            "image_quality" => self.image_quality.clone(),
            "filename_prefix" => self.filename_prefix.clone(),
            "screenshot_save_directory" => self.screenshot_save_directory.clone(),
            "hot_key1_modifier" => self.hot_key1.modifier.label().to_string(),
            "hot_key1_key_code" => self.hot_key1.key_code.label().to_string(),
            "hot_key2_modifier" => self.hot_key2.modifier.label().to_string(),
            "hot_key2_key_code" => self.hot_key2.key_code.label().to_string(),
            "resize_image" => encode_bool(self.resize_image).to_string(),
            "resize_value" => self.resize_value.to_string(),
            "auto_grab" => encode_bool(self.auto_grab).to_string(),
            "auto_grab_type" => self.auto_grab_type.label().to_string(),
            "auto_grab_interval" => self.auto_grab_interval.to_string(),
            _ => String::new(),
        }
    }

    /// Parses and assigns one setting from its stored encoding.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "user_id" => self.user_id = value.trim().to_string(),
            "copy_url_to_clipboard" => self.copy_url_to_clipboard = parse_bool(key, value)?,
            "shorten_urls" => self.shorten_urls = parse_bool(key, value)?,
            "enable_toast_notifications" => {
                self.enable_toast_notifications = parse_bool(key, value)?;
            }
            "image_format" => self.image_format = parse_with(key, value)?,
            "image_quality" => {
                if ImageQuality::from_label(value).is_none() {
                    warn!(value, "Unrecognized image quality, JPEG will use 100");
                }
                self.image_quality = value.to_string();
            }
            "filename_prefix" => {
                if value.is_empty() || value.contains(['/', '\\']) {
                    return Err(invalid(key, value, "prefix must be a non-empty file name"));
                }
                self.filename_prefix = value.to_string();
            }
            "screenshot_save_directory" => self.screenshot_save_directory = value.to_string(),
            "hot_key1_modifier" => self.hot_key1.modifier = parse_with(key, value)?,
            "hot_key1_key_code" => self.hot_key1.key_code = parse_with(key, value)?,
            "hot_key2_modifier" => self.hot_key2.modifier = parse_with(key, value)?,
            "hot_key2_key_code" => self.hot_key2.key_code = parse_with(key, value)?,
            "resize_image" => self.resize_image = parse_bool(key, value)?,
            "resize_value" => self.resize_value = parse_with(key, value)?,
            "auto_grab" => self.auto_grab = parse_bool(key, value)?,
            "auto_grab_type" => self.auto_grab_type = parse_with(key, value)?,
            "auto_grab_interval" => self.auto_grab_interval = parse_with(key, value)?,
            _ => {
                return Err(GrabError::UnknownSetting {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// True when a publish call would actually do something.
    pub fn wants_clipboard_url(&self) -> bool {
        self.copy_url_to_clipboard && !self.user_id.is_empty()
    }
}

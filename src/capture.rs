//! Screen capture.
//!
//! [`capture`] produces one [`CapturedImage`] of either the primary display
//! or the focused window. OS access sits behind [`ScreenSource`]; the real
//! implementation is [`XcapSource`].

use image::RgbaImage;
use tracing::{debug, instrument, warn};
use xcap::{Monitor, Window};

use crate::error::{GrabError, Result};

/// A captured raster, moved into the exporter and consumed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pixels: RgbaImage,
}

impl CapturedImage {
    pub const fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn into_inner(self) -> RgbaImage {
        self.pixels
    }
}

/// Rectangle in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        x >= left
            && y >= top
            && x < left + i64::from(self.width)
            && y < top + i64::from(self.height)
    }
}

/// One display's pixels plus its position on the virtual desktop.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub x: i32,
    pub y: i32,
    pub image: RgbaImage,
}

/// The focused window as reported by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    pub title: String,
    pub rect: Rect,
    pub minimized: bool,
}

/// OS access needed for a capture.
pub trait ScreenSource {
    /// Captures the primary display.
    fn capture_primary(&self) -> Result<DisplayFrame>;

    /// Captures the display containing the given desktop point.
    fn capture_display_at(&self, x: i32, y: i32) -> Result<DisplayFrame>;

    /// Returns the focused window, if any.
    fn foreground_window(&self) -> Result<Option<ForegroundWindow>>;
}

/// Captures the full primary display, or only the focused window.
///
/// Window captures crop the display under the window's top-left corner to
/// the window frame. A missing focused window is an error rather than a
/// silent fallback to full screen.
#[instrument(skip(source))]
pub fn capture<S: ScreenSource + ?Sized>(source: &S, full_screen: bool) -> Result<CapturedImage> {
    if full_screen {
        let frame = source.capture_primary()?;
        debug!(
            width = frame.image.width(),
            height = frame.image.height(),
            "Captured primary display"
        );
        return Ok(CapturedImage::new(frame.image));
    }

    let window = source
        .foreground_window()?
        .ok_or(GrabError::NoForegroundWindow)?;
    if window.minimized {
        return Err(GrabError::WindowMinimized);
    }

    debug!(title = %window.title, rect = ?window.rect, "Capturing foreground window");
    let frame = source.capture_display_at(window.rect.x, window.rect.y)?;
    crop_to_rect(&frame, window.rect).map(CapturedImage::new)
}

/// Crops a display frame to a desktop rectangle, clamped to the display.
pub fn crop_to_rect(frame: &DisplayFrame, rect: Rect) -> Result<RgbaImage> {
    let frame_w = i64::from(frame.image.width());
    let frame_h = i64::from(frame.image.height());

    let left = (i64::from(rect.x) - i64::from(frame.x)).clamp(0, frame_w);
    let top = (i64::from(rect.y) - i64::from(frame.y)).clamp(0, frame_h);
    let right = (i64::from(rect.x) - i64::from(frame.x) + i64::from(rect.width)).clamp(0, frame_w);
    let bottom =
        (i64::from(rect.y) - i64::from(frame.y) + i64::from(rect.height)).clamp(0, frame_h);

    if right <= left || bottom <= top {
        return Err(GrabError::Capture(format!(
            "window {rect:?} does not intersect the display"
        )));
    }

    // All four values are within 0..=u32::MAX after clamping to the frame.
    let to_u32 = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);
    let cropped = image::imageops::crop_imm(
        &frame.image,
        to_u32(left),
        to_u32(top),
        to_u32(right - left),
        to_u32(bottom - top),
    )
    .to_image();
    Ok(cropped)
}

/// Screen source backed by the `xcap` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct XcapSource;

fn xcap_error(context: &str, e: &xcap::XCapError) -> GrabError {
    GrabError::Capture(format!("{context}: {e}"))
}

fn monitor_rect(monitor: &Monitor) -> Option<Rect> {
    Some(Rect::new(
        monitor.x().ok()?,
        monitor.y().ok()?,
        monitor.width().ok()?,
        monitor.height().ok()?,
    ))
}

fn capture_monitor(monitor: &Monitor) -> Result<DisplayFrame> {
    let image = monitor
        .capture_image()
        .map_err(|e| xcap_error("Failed to capture display", &e))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(GrabError::Capture(
            "captured an empty image (missing screen recording permission?)".to_string(),
        ));
    }
    Ok(DisplayFrame {
        x: monitor.x().unwrap_or(0),
        y: monitor.y().unwrap_or(0),
        image,
    })
}

impl ScreenSource for XcapSource {
    fn capture_primary(&self) -> Result<DisplayFrame> {
        let monitors = Monitor::all().map_err(|e| xcap_error("Failed to enumerate displays", &e))?;
        let primary = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or_else(|| GrabError::Capture("no display found".to_string()))?;
        capture_monitor(primary)
    }

    fn capture_display_at(&self, x: i32, y: i32) -> Result<DisplayFrame> {
        let monitors = Monitor::all().map_err(|e| xcap_error("Failed to enumerate displays", &e))?;
        match monitors
            .iter()
            .find(|m| monitor_rect(m).is_some_and(|r| r.contains(x, y)))
        {
            Some(monitor) => capture_monitor(monitor),
            None => {
                warn!(x, y, "Point is on no display, using the primary display");
                self.capture_primary()
            }
        }
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        let windows = Window::all().map_err(|e| xcap_error("Failed to enumerate windows", &e))?;
        let focused = windows.into_iter().find(|w| w.is_focused().unwrap_or(false));

        Ok(focused.map(|w| ForegroundWindow {
            title: w.title().unwrap_or_default(),
            rect: Rect::new(
                w.x().unwrap_or(0),
                w.y().unwrap_or(0),
                w.width().unwrap_or(0),
                w.height().unwrap_or(0),
            ),
            minimized: w.is_minimized().unwrap_or(false),
        }))
    }
}

//! Image export into the Dropbox Public folder.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use tracing::{debug, info, instrument};

use crate::capture::CapturedImage;
use crate::error::Result;
use crate::settings::{ImageFormat, Settings, jpeg_quality_for_label};
use crate::sync_folder::public_folder;

/// Timestamp layout used in file names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Builds `<prefix>_<YYYYMMDDHHMMSS>.<ext>`.
pub fn file_name<Tz: TimeZone>(prefix: &str, format: ImageFormat, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{prefix}_{}.{}",
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

/// Directory screenshots are written to: `<sync_root>/Public/<subdir>`.
pub fn save_directory(sync_root: &Path, settings: &Settings) -> PathBuf {
    let public = public_folder(sync_root);
    let subdir = settings.screenshot_save_directory.trim();
    if subdir.is_empty() {
        public
    } else {
        public.join(subdir)
    }
}

/// Applies the configured resize, if enabled.
pub fn apply_resize(image: RgbaImage, settings: &Settings) -> RgbaImage {
    if !settings.resize_image {
        return image;
    }
    let (width, height) = image.dimensions();
    let new_width = settings.resize_value.scale(width);
    let new_height = settings.resize_value.scale(height);
    debug!(
        from = ?(width, height),
        to = ?(new_width, new_height),
        percent = settings.resize_value.get(),
        "Resizing image"
    );
    image::imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Encodes `image` into `path` using the configured format.
///
/// JPEG drops the alpha channel and uses the quality tier from settings;
/// PNG uses the best compression level.
pub fn encode_to_file(image: &RgbaImage, path: &Path, settings: &Settings) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let (width, height) = image.dimensions();

    match settings.image_format {
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive);
            encoder.write_image(image.as_raw(), width, height, image::ExtendedColorType::Rgba8)?;
        }
        ImageFormat::Jpeg => {
            let quality = jpeg_quality_for_label(&settings.image_quality);
            debug!(label = %settings.image_quality, quality, "JPEG quality");
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            encoder.write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;
        }
    }
    Ok(())
}

/// Exports a capture and returns the generated file name.
///
/// The destination directory must already exist; the full path is
/// `save_directory(sync_root, settings).join(file_name)`.
pub fn export(image: CapturedImage, settings: &Settings, sync_root: &Path) -> Result<String> {
    export_at(image, settings, sync_root, &Local::now())
}

/// Same as [`export`] with an explicit timestamp.
#[instrument(skip_all, fields(format = settings.image_format.label()))]
pub fn export_at<Tz: TimeZone>(
    image: CapturedImage,
    settings: &Settings,
    sync_root: &Path,
    at: &DateTime<Tz>,
) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let name = file_name(&settings.filename_prefix, settings.image_format, at);
    let path = save_directory(sync_root, settings).join(&name);

    let pixels = apply_resize(image.into_inner(), settings);
    encode_to_file(&pixels, &path, settings)?;

    info!(
        path = %path.display(),
        width = pixels.width(),
        height = pixels.height(),
        "Screenshot saved"
    );
    Ok(name)
}

//! PNG encoding of a finished strip.

use image::{ImageEncoder, Rgba, RgbaImage};
use tiny_skia::Pixmap;

/// File name used for downloaded and shared strips.
pub const STRIP_FILENAME: &str = "photo-strip.png";

/// MIME type of [`encode_png`] output.
pub const PNG_MIME: &str = "image/png";

/// Errors that can occur while exporting a strip.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// Title and message attached to a shared strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    /// Share sheet title.
    pub title: String,
    /// Share sheet message.
    pub text: String,
    /// Name of the attached file.
    pub filename: String,
}

impl Default for SharePayload {
    fn default() -> Self {
        Self {
            title: "My Photo Strip".to_owned(),
            text: "Check out my photo strip \u{1F389}".to_owned(),
            filename: STRIP_FILENAME.to_owned(),
        }
    }
}

/// Convert a premultiplied surface into straight RGBA.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap.data();
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, src) in img.pixels_mut().zip(data.chunks_exact(4)) {
        let a = src[3];
        if a == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            // Un-premultiply: channel = premultiplied * 255 / alpha.
            let unmul = |c: u8| (u16::from(c) * 255 / u16::from(a)) as u8;
            *pixel = Rgba([unmul(src[0]), unmul(src[1]), unmul(src[2]), a]);
        }
    }
    img
}

/// Encode a surface as PNG.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if encoding fails.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let img = to_rgba_image(pixmap);
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

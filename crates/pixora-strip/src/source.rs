//! Image references, decoding, and the slot loading seam.
//!
//! Captured and uploaded photos are stored as self-contained base64
//! data URLs (what `canvas.toDataURL` and `FileReader.readAsDataURL`
//! produce), so a reference can be persisted as a plain string and
//! decoded later without any other I/O.

use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::types::{RgbaImage, StripError};

/// Allowed file extensions for uploaded photos.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Opaque handle to one encoded still image.
///
/// Dimensions are unknown until the image is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an already-encoded reference (normally a data URL).
    #[must_use]
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Encode raw file bytes as a base64 data URL.
    #[must_use]
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    /// Encode an uploaded file, choosing the MIME type from its name.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::UnsupportedFile`] if the extension is not in
    /// [`ALLOWED_EXTENSIONS`].
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Result<Self, StripError> {
        let mime_type = mime_for_file(file_name)
            .ok_or_else(|| StripError::UnsupportedFile(file_name.to_owned()))?;
        Ok(Self::from_bytes(mime_type, bytes))
    }

    /// The stored string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the encoded file bytes from the data URL.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::InvalidDataUrl`] if the reference is not a
    /// `data:...;base64,` URL or the payload is not valid base64.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, StripError> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| StripError::InvalidDataUrl(self.preview()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StripError::InvalidDataUrl(self.preview()))?;
        if !header.ends_with(";base64") {
            return Err(StripError::InvalidDataUrl(self.preview()));
        }
        STANDARD
            .decode(payload.trim())
            .map_err(|e| StripError::InvalidDataUrl(format!("{}: {e}", self.preview())))
    }

    /// Short prefix of the reference for error messages; data URLs can
    /// be megabytes long.
    fn preview(&self) -> String {
        const LIMIT: usize = 32;
        match self.0.char_indices().nth(LIMIT) {
            Some((cut, _)) => format!("{}...", &self.0[..cut]),
            None => self.0.clone(),
        }
    }
}

/// MIME type for an uploaded file name, if the extension is allowed.
#[must_use]
pub fn mime_for_file(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(match ext.as_str() {
        "png" => "image/png",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    })
}

/// Decode raw image bytes into RGBA.
///
/// Supports PNG, JPEG, BMP, and WebP (whatever the `image` crate was
/// built with).
///
/// # Errors
///
/// Returns [`StripError::EmptyInput`] if `bytes` is empty.
/// Returns [`StripError::ImageDecode`] if the format is unrecognized or
/// the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, StripError> {
    if bytes.is_empty() {
        return Err(StripError::EmptyInput);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Resolves an [`ImageRef`] into pixels.
///
/// Each call is one independent load-or-fail operation; the compositor
/// joins one per slot. Implementations must not share progress state
/// between calls.
pub trait ImageLoader {
    /// Load and decode one image.
    fn load(&self, image: &ImageRef) -> impl Future<Output = Result<RgbaImage, StripError>>;
}

/// Loader for self-contained data URLs. Resolves without suspending.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlLoader;

impl ImageLoader for DataUrlLoader {
    async fn load(&self, image: &ImageRef) -> Result<RgbaImage, StripError> {
        let bytes = image.decode_bytes()?;
        decode_image(&bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    /// Helper: encode a solid-color RGBA image as PNG bytes.
    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn data_url_round_trip_preserves_bytes() {
        let bytes = png_bytes(3, 2, [10, 20, 30, 255]);
        let image_ref = ImageRef::from_bytes("image/png", &bytes);
        assert!(image_ref.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(image_ref.decode_bytes().unwrap(), bytes);
    }

    #[test]
    fn loader_decodes_pixels() {
        let image_ref = ImageRef::from_bytes("image/png", &png_bytes(4, 5, [1, 2, 3, 255]));
        let img = block_on(DataUrlLoader.load(&image_ref)).unwrap();
        assert_eq!(img.dimensions(), (4, 5));
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn non_data_urls_are_rejected() {
        let result = ImageRef::new("https://via.placeholder.com/170x130").decode_bytes();
        assert!(matches!(result, Err(StripError::InvalidDataUrl(_))));

        let result = ImageRef::new("data:image/png,rawtext").decode_bytes();
        assert!(matches!(result, Err(StripError::InvalidDataUrl(_))));

        let result = ImageRef::new("data:image/png;base64,!!!").decode_bytes();
        assert!(matches!(result, Err(StripError::InvalidDataUrl(_))));
    }

    #[test]
    fn corrupt_payload_fails_to_decode() {
        let image_ref = ImageRef::from_bytes("image/png", &[0xFF, 0xFE, 0x00, 0x01]);
        let result = block_on(DataUrlLoader.load(&image_ref));
        assert!(matches!(result, Err(StripError::ImageDecode(_))));
    }

    #[test]
    fn empty_payload_is_empty_input() {
        let image_ref = ImageRef::from_bytes("image/png", &[]);
        let result = block_on(DataUrlLoader.load(&image_ref));
        assert!(matches!(result, Err(StripError::EmptyInput)));
    }

    #[test]
    fn upload_extensions() {
        assert_eq!(mime_for_file("me.PNG"), Some("image/png"));
        assert_eq!(mime_for_file("me.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_file("me.jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_file("archive.tar.webp"), Some("image/webp"));
        assert_eq!(mime_for_file("notes.txt"), None);
        assert_eq!(mime_for_file("no_extension"), None);

        assert!(matches!(
            ImageRef::from_upload("clip.gif", &[1, 2, 3]),
            Err(StripError::UnsupportedFile(name)) if name == "clip.gif"
        ));
    }

    #[test]
    fn error_preview_is_truncated() {
        let long = format!("http://{}", "x".repeat(500));
        let Err(StripError::InvalidDataUrl(msg)) = ImageRef::new(long).decode_bytes() else {
            unreachable!("expected InvalidDataUrl");
        };
        assert!(msg.len() < 64, "preview too long: {msg}");
    }
}

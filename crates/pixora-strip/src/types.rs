//! Shared types for the pixora strip compositor.

use serde::{Deserialize, Serialize};

use crate::color::CssColor;
use crate::sticker::StickerPlacement;

/// Re-export `RgbaImage` so downstream crates can hand decoded photos
/// around without depending on `image` directly.
pub use image::RgbaImage;

/// Re-export the surface type produced by the compositor.
pub use tiny_skia::Pixmap;

/// A 2D point in surface coordinates (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f32,
    /// Vertical position (pixels from top edge).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Everything a single render needs besides the photos and the layout.
///
/// A render call receives its own clone, so later edits never leak
/// into a render that is still waiting on image loads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeState {
    /// Strip background fill.
    pub background_color: CssColor,
    /// Placed stickers in paint order (last paints on top).
    pub stickers: Vec<StickerPlacement>,
}

/// Visual constants of the strip that are not part of the layout grid.
///
/// Defaults reproduce the stock Pixora look. The CLI accepts a full
/// JSON serialization of this struct via `--style-json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripStyle {
    /// Branding label drawn centred near the bottom edge of every strip.
    pub watermark_text: String,
    /// Watermark ink.
    pub watermark_color: CssColor,
    /// Watermark font size in pixels.
    pub watermark_size: f32,
    /// Distance from the bottom edge to the watermark baseline.
    pub watermark_baseline_offset: f32,
    /// Ink used for sticker glyphs.
    pub sticker_color: CssColor,
    /// Where newly added stickers appear.
    pub sticker_origin: Point,
    /// Font size of newly added stickers.
    pub sticker_size: f32,
    /// Fill of slots that have no photo.
    pub placeholder_color: CssColor,
    /// Label drawn in slots that have no photo.
    pub placeholder_text: String,
    /// Ink of the placeholder label.
    pub placeholder_text_color: CssColor,
}

impl StripStyle {
    pub const DEFAULT_WATERMARK_TEXT: &'static str = "Pixora";
    pub const DEFAULT_WATERMARK_SIZE: f32 = 13.0;
    pub const DEFAULT_WATERMARK_BASELINE_OFFSET: f32 = 12.0;
    pub const DEFAULT_STICKER_ORIGIN: Point = Point::new(50.0, 50.0);
    pub const DEFAULT_STICKER_SIZE: f32 = 32.0;
    pub const DEFAULT_PLACEHOLDER_TEXT: &'static str = "Photo";
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            watermark_text: Self::DEFAULT_WATERMARK_TEXT.to_owned(),
            watermark_color: CssColor::known("#ff6f91", [255, 111, 145, 255]),
            watermark_size: Self::DEFAULT_WATERMARK_SIZE,
            watermark_baseline_offset: Self::DEFAULT_WATERMARK_BASELINE_OFFSET,
            sticker_color: CssColor::known("black", [0, 0, 0, 255]),
            sticker_origin: Self::DEFAULT_STICKER_ORIGIN,
            sticker_size: Self::DEFAULT_STICKER_SIZE,
            placeholder_color: CssColor::known("#cccccc", [204, 204, 204, 255]),
            placeholder_text: Self::DEFAULT_PLACEHOLDER_TEXT.to_owned(),
            placeholder_text_color: CssColor::known("#969696", [150, 150, 150, 255]),
        }
    }
}

/// Errors that can occur while building or rendering a strip.
#[derive(Debug, thiserror::Error)]
pub enum StripError {
    /// Image bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Image data was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A stored image reference is not a base64 data URL.
    #[error("invalid image data URL: {0}")]
    InvalidDataUrl(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// An uploaded file has an extension the decoder does not support.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    /// A font could not be parsed.
    #[error("failed to load font: {0}")]
    Font(String),

    /// The drawing surface could not be allocated.
    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_stock_look() {
        let style = StripStyle::default();
        assert_eq!(style.watermark_text, "Pixora");
        assert_eq!(style.watermark_color.rgba(), [255, 111, 145, 255]);
        assert_eq!(style.sticker_origin, Point::new(50.0, 50.0));
        assert!((style.sticker_size - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_style_json_fills_defaults() {
        let style: StripStyle =
            serde_json::from_str(r#"{"watermark_text": "Booth", "sticker_size": 48}"#).unwrap();
        assert_eq!(style.watermark_text, "Booth");
        assert!((style.sticker_size - 48.0).abs() < f32::EPSILON);
        assert_eq!(style.placeholder_text, "Photo");
    }

    #[test]
    fn composite_state_defaults_to_white_and_empty() {
        let state = CompositeState::default();
        assert_eq!(state.background_color.as_str(), "white");
        assert!(state.stickers.is_empty());
    }

    #[test]
    fn point_subtraction() {
        assert_eq!(
            Point::new(10.0, 7.0) - Point::new(4.0, 2.0),
            Point::new(6.0, 5.0)
        );
    }
}

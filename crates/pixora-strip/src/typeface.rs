//! Glyph measurement and rasterisation for stickers and labels.
//!
//! Sticker hit boxes and sticker drawing both go through
//! [`TextMeasure::text_width`], so what the user sees and what the
//! pointer can grab always agree.

use std::sync::{Arc, OnceLock};

use fontdue::{Font, FontSettings};
use tiny_skia::{Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use crate::color::CssColor;
use crate::types::StripError;

/// Regular face used for stickers and placeholder labels.
pub(crate) static REGULAR_TTF: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

/// Bold face used for the watermark.
pub(crate) static BOLD_TTF: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans-Bold.ttf");

/// Width of a string at a given font size.
pub trait TextMeasure {
    /// Rendered width of `text` at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Characters that modify a neighbouring glyph and take no space
/// themselves (zero-width joiner, variation selectors).
const fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200D}' | '\u{FE00}'..='\u{FE0F}')
}

/// A parsed font face, optionally backed by fallback faces.
///
/// Each character is measured and drawn with the first face in the
/// chain that has a glyph for it. Characters no face covers use the
/// primary face's notdef glyph.
#[derive(Clone)]
pub struct Typeface {
    primary: Font,
    fallbacks: Vec<Font>,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.faces().map(|font| (font.name(), font.glyph_count())))
            .finish()
    }
}

impl Typeface {
    /// Parse a TrueType/OpenType font.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::Font`] if the bytes are not a usable font.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StripError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| StripError::Font(e.to_owned()))?;
        Ok(Self {
            primary: font,
            fallbacks: Vec::new(),
        })
    }

    /// Append `fallback`'s faces after this one's.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Self) -> Self {
        self.fallbacks.push(fallback.primary);
        self.fallbacks.extend(fallback.fallbacks);
        self
    }

    /// Whether some face in the chain has a real glyph for `c`.
    #[must_use]
    pub fn has_glyph(&self, c: char) -> bool {
        is_zero_width(c) || self.faces().any(|font| font.lookup_glyph_index(c) != 0)
    }

    fn faces(&self) -> impl Iterator<Item = &Font> {
        std::iter::once(&self.primary).chain(&self.fallbacks)
    }

    /// Face that draws `c`.
    fn face_for(&self, c: char) -> &Font {
        self.faces()
            .find(|font| font.lookup_glyph_index(c) != 0)
            .unwrap_or(&self.primary)
    }

    /// Distance from the top of the em box to the baseline.
    fn ascent(&self, size: f32) -> f32 {
        self.primary
            .horizontal_line_metrics(size)
            .map_or(size * 0.8, |m| m.ascent)
    }

    /// Draw `text` with its left edge at `x` and its alphabetic
    /// baseline at `baseline`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn draw_on_baseline(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: &CssColor,
    ) {
        let mut pen = x;
        for c in text.chars().filter(|&c| !is_zero_width(c)) {
            let (metrics, coverage) = self.face_for(c).rasterize(c, size);
            if let Some(glyph) = coverage_pixmap(metrics.width, metrics.height, &coverage, color) {
                let left = pen.round() as i32 + metrics.xmin;
                let top = baseline.round() as i32 - metrics.height as i32 - metrics.ymin;
                pixmap.draw_pixmap(
                    left,
                    top,
                    glyph.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            pen += metrics.advance_width;
        }
    }

    /// Draw `text` with its em box top-left corner at `(x, y)`
    /// (canvas `textAlign = left`, `textBaseline = top`).
    pub fn draw_top_left(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: &CssColor,
    ) {
        let baseline = y + self.ascent(size);
        self.draw_on_baseline(pixmap, text, x, baseline, size, color);
    }

    /// Draw `text` horizontally centred on `center_x` with its
    /// alphabetic baseline at `baseline`.
    pub fn draw_centered(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        center_x: f32,
        baseline: f32,
        size: f32,
        color: &CssColor,
    ) {
        let x = center_x - self.text_width(text, size) / 2.0;
        self.draw_on_baseline(pixmap, text, x, baseline, size, color);
    }
}

impl TextMeasure for Typeface {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .filter(|&c| !is_zero_width(c))
            .map(|c| self.face_for(c).metrics(c, size).advance_width)
            .sum()
    }
}

/// Build a premultiplied glyph pixmap from a fontdue coverage mask.
///
/// Returns `None` for empty glyphs (spaces).
#[allow(clippy::cast_possible_truncation)]
fn coverage_pixmap(
    width: usize,
    height: usize,
    coverage: &[u8],
    color: &CssColor,
) -> Option<Pixmap> {
    let mut glyph = Pixmap::new(u32::try_from(width).ok()?, u32::try_from(height).ok()?)?;
    let [r, g, b, a] = color.rgba();
    let scale = |channel: u8, factor: u16| (u16::from(channel) * factor / 255) as u8;

    for (dst, &cov) in glyph.pixels_mut().iter_mut().zip(coverage) {
        let alpha = scale(a, u16::from(cov));
        let factor = u16::from(alpha);
        if let Some(px) =
            PremultipliedColorU8::from_rgba(scale(r, factor), scale(g, factor), scale(b, factor), alpha)
        {
            *dst = px;
        }
    }
    Some(glyph)
}

/// The typefaces a strip is drawn with.
///
/// Cheap to clone; the faces are shared.
#[derive(Debug, Clone)]
pub struct Fonts {
    /// Face for stickers and placeholder labels. Also used for sticker
    /// hit testing.
    pub sticker: Arc<Typeface>,
    /// Face for the watermark.
    pub watermark: Arc<Typeface>,
}

impl Fonts {
    /// The bundled DejaVu faces, parsed once per process.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::Font`] if the bundled font data is unusable.
    pub fn embedded() -> Result<Self, StripError> {
        static EMBEDDED: OnceLock<Result<Fonts, String>> = OnceLock::new();
        EMBEDDED
            .get_or_init(|| {
                let sticker = Typeface::from_bytes(REGULAR_TTF).map_err(|e| e.to_string())?;
                let watermark = Typeface::from_bytes(BOLD_TTF).map_err(|e| e.to_string())?;
                Ok(Self {
                    sticker: Arc::new(sticker),
                    watermark: Arc::new(watermark),
                })
            })
            .clone()
            .map_err(StripError::Font)
    }

    /// Draw stickers with `face` first (e.g. a monochrome emoji font),
    /// falling back to the current sticker faces for characters it lacks.
    #[must_use]
    pub fn with_sticker_face(mut self, face: Typeface) -> Self {
        self.sticker = Arc::new(face.with_fallback(Typeface::clone(&self.sticker)));
        self
    }
}

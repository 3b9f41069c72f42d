//! Sticker placements and pointer hit testing.
//!
//! Stickers are kept in paint order: later entries are drawn on top.
//! Hit testing approximates the glyph box as the measured advance
//! width by the font size, which is also the box the compositor draws
//! into.

use serde::{Deserialize, Serialize};

use crate::typeface::TextMeasure;
use crate::types::Point;

/// Symbols offered on the sticker palette. Every one has a glyph in the
/// bundled sticker face.
pub const PALETTE: [&str; 12] = [
    "\u{2605}", // ★
    "\u{2665}", // ♥
    "\u{273F}", // ✿
    "\u{2740}", // ❀
    "\u{2600}", // ☀
    "\u{2601}", // ☁
    "\u{2602}", // ☂
    "\u{2744}", // ❄
    "\u{266A}", // ♪
    "\u{263A}", // ☺
    "\u{2708}", // ✈
    "\u{265B}", // ♛
];

/// One emoji decoration placed on the strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerPlacement {
    /// The symbol drawn (normally a single emoji).
    pub symbol: String,
    /// Left edge of the em box.
    pub x: f32,
    /// Top edge of the em box.
    pub y: f32,
    /// Font size in pixels; also the hit box height.
    pub font_size: f32,
}

/// Axis-aligned box covered by a sticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickerBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl StickerBounds {
    /// Inclusive containment on all four edges.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.x <= p.x && p.x <= self.x + self.width && self.y <= p.y && p.y <= self.y + self.height
    }
}

impl StickerPlacement {
    /// Create a sticker with its em box top-left corner at `origin`.
    #[must_use]
    pub fn new(symbol: impl Into<String>, origin: Point, font_size: f32) -> Self {
        Self {
            symbol: symbol.into(),
            x: origin.x,
            y: origin.y,
            font_size,
        }
    }

    /// Top-left corner of the em box.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Hit box: measured text width by font size.
    #[must_use]
    pub fn bounds(&self, measure: &impl TextMeasure) -> StickerBounds {
        StickerBounds {
            x: self.x,
            y: self.y,
            width: measure.text_width(&self.symbol, self.font_size),
            height: self.font_size,
        }
    }

    /// Whether `p` falls inside this sticker's hit box.
    #[must_use]
    pub fn hit(&self, p: Point, measure: &impl TextMeasure) -> bool {
        self.bounds(measure).contains(p)
    }
}

/// Index of the topmost (most recently added) sticker under `p`.
#[must_use]
pub fn topmost_hit(
    stickers: &[StickerPlacement],
    p: Point,
    measure: &impl TextMeasure,
) -> Option<usize> {
    stickers.iter().rposition(|s| s.hit(p, measure))
}

/// Index of the bottommost (least recently added) sticker under `p`.
#[must_use]
pub fn bottommost_hit(
    stickers: &[StickerPlacement],
    p: Point,
    measure: &impl TextMeasure,
) -> Option<usize> {
    stickers.iter().position(|s| s.hit(p, measure))
}

/// Pointer gesture state of the sticker layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No sticker is being dragged.
    #[default]
    Idle,
    /// A press landed on sticker `index`; moves reposition it.
    Dragging {
        /// Index into the sticker list.
        index: usize,
        /// Press point minus the sticker origin, kept constant for the
        /// whole drag so the sticker does not jump under the pointer.
        offset: Point,
    },
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character is `size * 0.5` wide, independent of the glyph.
    pub(crate) struct HalfEm;

    impl TextMeasure for HalfEm {
        #[allow(clippy::cast_precision_loss)]
        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }
    }

    fn sticker(symbol: &str, x: f32, y: f32) -> StickerPlacement {
        StickerPlacement::new(symbol, Point::new(x, y), 20.0)
    }

    #[test]
    fn bounds_use_measured_width_and_size_height() {
        let s = StickerPlacement::new("ab", Point::new(5.0, 6.0), 10.0);
        assert_eq!(
            s.bounds(&HalfEm),
            StickerBounds {
                x: 5.0,
                y: 6.0,
                width: 10.0,
                height: 10.0
            }
        );
    }

    #[test]
    fn containment_is_inclusive() {
        let s = sticker("x", 10.0, 10.0); // 10 wide, 20 tall
        assert!(s.hit(Point::new(10.0, 10.0), &HalfEm));
        assert!(s.hit(Point::new(20.0, 30.0), &HalfEm));
        assert!(!s.hit(Point::new(20.01, 30.0), &HalfEm));
        assert!(!s.hit(Point::new(9.99, 15.0), &HalfEm));
        assert!(!s.hit(Point::new(15.0, 30.01), &HalfEm));
    }

    #[test]
    fn scan_directions_differ_on_overlap() {
        let stickers = vec![sticker("a", 0.0, 0.0), sticker("b", 5.0, 5.0)];
        let p = Point::new(8.0, 8.0);
        assert_eq!(topmost_hit(&stickers, p, &HalfEm), Some(1));
        assert_eq!(bottommost_hit(&stickers, p, &HalfEm), Some(0));
    }

    #[test]
    fn miss_returns_none() {
        let stickers = vec![sticker("a", 0.0, 0.0)];
        let p = Point::new(100.0, 100.0);
        assert_eq!(topmost_hit(&stickers, p, &HalfEm), None);
        assert_eq!(bottommost_hit(&stickers, p, &HalfEm), None);
        assert_eq!(topmost_hit(&[], p, &HalfEm), None);
    }
}

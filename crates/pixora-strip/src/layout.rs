//! Slot geometry for the vertical strip.
//!
//! The strip is a single column of equally sized photo slots. The
//! surface height depends only on the configured slot count, never on
//! how many photos actually loaded.

use serde::{Deserialize, Serialize};

use crate::session::SessionSnapshot;
use crate::types::{Dimensions, Point};

/// Fixed layout of a strip, derived once per editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of photo slots.
    pub photo_count: u32,
    /// Vertical gap between consecutive slots.
    pub spacing: u32,
    /// Width every photo is stretched to.
    pub photo_width: u32,
    /// Height every photo is stretched to.
    pub photo_height: u32,
    /// Width of the whole strip surface.
    pub strip_width: u32,
}

impl LayoutConfig {
    /// Extra height added below the slot column (top offset plus room
    /// for the watermark).
    pub const MARGIN: u32 = 40;
    /// Distance from the top edge to the first slot.
    pub const TOP_OFFSET: u32 = Self::MARGIN / 2;
    pub const DEFAULT_PHOTO_COUNT: u32 = 4;
    pub const DEFAULT_SPACING: u32 = 20;
    pub const DEFAULT_PHOTO_WIDTH: u32 = 170;
    pub const DEFAULT_PHOTO_HEIGHT: u32 = 130;
    /// Longest surface side a browser canvas accepts.
    pub const MAX_SURFACE_SIDE: u32 = 32_767;
    /// Largest surface area a browser canvas accepts, in pixels.
    pub const MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

    /// Layout with the default grid and `photo_count` slots.
    #[must_use]
    pub fn with_photo_count(photo_count: u32) -> Self {
        Self {
            photo_count,
            ..Self::default()
        }
    }

    /// Derive the slot count for an editing session.
    ///
    /// Uses the stored pose count when present, otherwise the number of
    /// stored photos, otherwise [`Self::DEFAULT_PHOTO_COUNT`].
    #[must_use]
    pub fn for_session(session: &SessionSnapshot) -> Self {
        let from_photos = u32::try_from(session.photos.len())
            .ok()
            .filter(|&n| n > 0);
        let photo_count = session
            .pose_count
            .or(from_photos)
            .unwrap_or(Self::DEFAULT_PHOTO_COUNT);
        Self::with_photo_count(photo_count)
    }

    /// Height of one slot plus the gap after it.
    #[must_use]
    pub const fn slot_pitch(&self) -> u32 {
        self.photo_height + self.spacing
    }

    /// Surface height: `photo_count * (photo_height + spacing) + MARGIN`.
    #[must_use]
    pub const fn surface_height(&self) -> u32 {
        self.photo_count.saturating_mul(self.slot_pitch()).saturating_add(Self::MARGIN)
    }

    /// Full surface dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.strip_width,
            height: self.surface_height(),
        }
    }

    /// Whether the surface is small enough to allocate and show.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn fits_surface(&self) -> bool {
        let Dimensions { width, height } = self.dimensions();
        width > 0
            && width <= Self::MAX_SURFACE_SIDE
            && height <= Self::MAX_SURFACE_SIDE
            && (width as u64) * (height as u64) <= Self::MAX_SURFACE_PIXELS
    }

    /// Top-left corner of slot `index`.
    ///
    /// Photos are centred horizontally; a photo wider than the strip
    /// gets a negative `x` and is clipped on both sides.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn slot_origin(&self, index: u32) -> Point {
        let x = (self.strip_width as f32 - self.photo_width as f32) / 2.0;
        let y = index as f32 * self.slot_pitch() as f32 + Self::TOP_OFFSET as f32;
        Point::new(x, y)
    }

    /// Iterate over the origins of all slots, top to bottom.
    pub fn slot_origins(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.photo_count).map(|i| self.slot_origin(i))
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            photo_count: Self::DEFAULT_PHOTO_COUNT,
            spacing: Self::DEFAULT_SPACING,
            photo_width: Self::DEFAULT_PHOTO_WIDTH,
            photo_height: Self::DEFAULT_PHOTO_HEIGHT,
            strip_width: Self::DEFAULT_PHOTO_WIDTH + Self::MARGIN,
        }
    }
}

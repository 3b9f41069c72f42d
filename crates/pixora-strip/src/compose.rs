//! The strip compositor.
//!
//! A render draws, in order: the background fill, one photo (or
//! placeholder) per slot, every sticker in paint order, and the
//! watermark. The photo loads run concurrently and are joined before
//! anything is drawn, so stickers always land on top of photos no
//! matter which load finished last.

use futures::future::join_all;
use image::imageops::{self, FilterType};
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, Rect, SpreadMode, Transform};

use crate::layout::LayoutConfig;
use crate::source::{ImageLoader, ImageRef};
use crate::typeface::Fonts;
use crate::types::{CompositeState, Point, RgbaImage, StripError, StripStyle};

/// What ended up in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// A photo was loaded and drawn.
    Photo,
    /// No photo existed for the slot; the placeholder was drawn.
    Placeholder,
    /// The photo failed to load; the slot shows the background.
    Skipped,
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The fully drawn surface.
    pub pixmap: Pixmap,
    /// Per-slot outcome, top to bottom.
    pub slots: Vec<SlotOutcome>,
}

/// Draws strips for one editing session.
///
/// Cheap to clone: the fonts are shared. Every [`render`](Self::render)
/// call is self-contained, so overlapping renders never observe each
/// other's progress.
#[derive(Debug, Clone)]
pub struct Compositor {
    layout: LayoutConfig,
    style: StripStyle,
    fonts: Fonts,
}

impl Compositor {
    /// Create a compositor for a fixed layout.
    #[must_use]
    pub const fn new(layout: LayoutConfig, style: StripStyle, fonts: Fonts) -> Self {
        Self {
            layout,
            style,
            fonts,
        }
    }

    /// The layout this compositor draws.
    #[must_use]
    pub const fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// The visual style this compositor draws with.
    #[must_use]
    pub const fn style(&self) -> &StripStyle {
        &self.style
    }

    /// The typefaces this compositor draws with.
    #[must_use]
    pub const fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    /// Render a strip.
    ///
    /// Slot `i` shows `images[i]` when present and loadable, the
    /// placeholder when `images` is shorter than the slot count, and the
    /// bare background when the load fails. The returned future resolves
    /// once every slot load has resolved; a load that never resolves
    /// stalls this render (and only this render).
    ///
    /// # Errors
    ///
    /// Returns [`StripError::Surface`] if the surface is larger than
    /// [`LayoutConfig::fits_surface`] allows or cannot be allocated.
    pub async fn render<L: ImageLoader>(
        &self,
        loader: &L,
        images: &[ImageRef],
        state: &CompositeState,
    ) -> Result<Rendered, StripError> {
        let dims = self.layout.dimensions();
        tracing::debug!(
            width = dims.width,
            height = dims.height,
            slots = self.layout.photo_count,
            photos = images.len(),
            stickers = state.stickers.len(),
            "rendering strip"
        );

        let too_large = StripError::Surface {
            width: dims.width,
            height: dims.height,
        };
        if !self.layout.fits_surface() {
            return Err(too_large);
        }
        let mut pixmap = Pixmap::new(dims.width, dims.height).ok_or(too_large)?;
        pixmap.fill(state.background_color.to_skia());

        let slots = self.draw_slots(&mut pixmap, loader, images).await;

        for sticker in &state.stickers {
            self.fonts.sticker.draw_top_left(
                &mut pixmap,
                &sticker.symbol,
                sticker.x,
                sticker.y,
                sticker.font_size,
                &self.style.sticker_color,
            );
        }

        self.draw_watermark(&mut pixmap);

        Ok(Rendered { pixmap, slots })
    }

    /// Load every slot concurrently, then draw them top to bottom.
    async fn draw_slots<L: ImageLoader>(
        &self,
        pixmap: &mut Pixmap,
        loader: &L,
        images: &[ImageRef],
    ) -> Vec<SlotOutcome> {
        let loads = (0..self.layout.photo_count).map(|i| async move {
            let image = usize::try_from(i).ok().and_then(|i| images.get(i))?;
            Some(loader.load(image).await)
        });
        let resolved = join_all(loads).await;

        resolved
            .into_iter()
            .zip(self.layout.slot_origins())
            .enumerate()
            .map(|(index, (result, origin))| match result {
                Some(Ok(photo)) => {
                    self.draw_photo(pixmap, &photo, origin);
                    SlotOutcome::Photo
                }
                Some(Err(e)) => {
                    tracing::warn!(slot = index, error = %e, "skipping photo that failed to load");
                    SlotOutcome::Skipped
                }
                None => {
                    self.draw_placeholder(pixmap, origin);
                    SlotOutcome::Placeholder
                }
            })
            .collect()
    }

    /// Stretch `photo` to exactly the slot size and draw it.
    #[allow(clippy::cast_precision_loss)]
    fn draw_photo(&self, pixmap: &mut Pixmap, photo: &RgbaImage, origin: Point) {
        let (w, h) = (self.layout.photo_width, self.layout.photo_height);
        let resized = if photo.dimensions() == (w, h) {
            photo.clone()
        } else {
            imageops::resize(photo, w, h, FilterType::Triangle)
        };
        let Some(tile) = rgba_to_pixmap(&resized) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(origin.x, origin.y, w as f32, h as f32) else {
            return;
        };
        // Fractional origins get anti-aliased edges.
        let paint = Paint {
            shader: Pattern::new(
                tile.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::from_translate(origin.x, origin.y),
            ),
            anti_alias: true,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_placeholder(&self, pixmap: &mut Pixmap, origin: Point) {
        let (w, h) = (
            self.layout.photo_width as f32,
            self.layout.photo_height as f32,
        );
        if let Some(rect) = Rect::from_xywh(origin.x, origin.y, w, h) {
            let mut paint = Paint::default();
            paint.set_color(self.style.placeholder_color.to_skia());
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }

        let size = (h / 6.0).max(1.0);
        self.fonts.sticker.draw_centered(
            pixmap,
            &self.style.placeholder_text,
            origin.x + w / 2.0,
            origin.y + h / 2.0 + size / 3.0,
            size,
            &self.style.placeholder_text_color,
        );
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_watermark(&self, pixmap: &mut Pixmap) {
        let dims = self.layout.dimensions();
        self.fonts.watermark.draw_centered(
            pixmap,
            &self.style.watermark_text,
            dims.width as f32 / 2.0,
            dims.height as f32 - self.style.watermark_baseline_offset,
            self.style.watermark_size,
            &self.style.watermark_color,
        );
    }
}

/// Convert straight RGBA into a premultiplied pixmap.
fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        let premul = |c: u8| u8::try_from(u16::from(c) * u16::from(a) / 255).unwrap_or(u8::MAX);
        if let Some(px) = tiny_skia::PremultipliedColorU8::from_rgba(premul(r), premul(g), premul(b), a)
        {
            *dst = px;
        }
    }
    Some(pixmap)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::Future;

    use futures::FutureExt;
    use futures::executor::block_on;

    use super::*;
    use crate::color::CssColor;
    use crate::source::DataUrlLoader;
    use crate::sticker::StickerPlacement;

    fn compositor(photo_count: u32) -> Compositor {
        Compositor::new(
            LayoutConfig::with_photo_count(photo_count),
            StripStyle::default(),
            Fonts::embedded().unwrap(),
        )
    }

    fn png_ref(rgba: [u8; 4]) -> ImageRef {
        let img = RgbaImage::from_pixel(8, 6, image::Rgba(rgba));
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
        ImageRef::from_bytes("image/png", &buf)
    }

    fn rgba_at(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    /// Whether any pixel in the rectangle differs from `background`.
    fn inked(pixmap: &Pixmap, x0: u32, y0: u32, x1: u32, y1: u32, background: [u8; 4]) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| rgba_at(pixmap, x, y) != background))
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn two_slot_strip_places_photos_at_documented_offsets() {
        let images = vec![png_ref([255, 0, 0, 255]), png_ref([0, 0, 255, 255])];
        let rendered =
            block_on(compositor(2).render(&DataUrlLoader, &images, &CompositeState::default()))
                .unwrap();
        let pixmap = &rendered.pixmap;

        assert_eq!((pixmap.width(), pixmap.height()), (210, 340));
        assert_eq!(rendered.slots, vec![SlotOutcome::Photo, SlotOutcome::Photo]);

        // Slot 0 spans y 20..150, slot 1 spans y 170..300, both x 20..190.
        assert_eq!(rgba_at(pixmap, 105, 85), [255, 0, 0, 255]);
        assert_eq!(rgba_at(pixmap, 105, 235), [0, 0, 255, 255]);
        assert_eq!(rgba_at(pixmap, 20, 20), [255, 0, 0, 255]);
        assert_eq!(rgba_at(pixmap, 189, 299), [0, 0, 255, 255]);
        // Gaps and margins keep the background.
        assert_eq!(rgba_at(pixmap, 105, 10), WHITE);
        assert_eq!(rgba_at(pixmap, 105, 160), WHITE);
        assert_eq!(rgba_at(pixmap, 10, 85), WHITE);
        assert_eq!(rgba_at(pixmap, 200, 235), WHITE);
    }

    #[test]
    fn missing_photos_get_placeholders() {
        let images = vec![png_ref([255, 0, 0, 255])];
        let rendered =
            block_on(compositor(3).render(&DataUrlLoader, &images, &CompositeState::default()))
                .unwrap();
        assert_eq!(
            rendered.slots,
            vec![
                SlotOutcome::Photo,
                SlotOutcome::Placeholder,
                SlotOutcome::Placeholder
            ]
        );
        // Placeholder fill near the slot corner (away from the label).
        assert_eq!(rgba_at(&rendered.pixmap, 25, 175), [204, 204, 204, 255]);
    }

    #[test]
    fn failed_loads_skip_the_slot_without_aborting() {
        let images = vec![ImageRef::new("not a data url"), png_ref([0, 255, 0, 255])];
        let rendered =
            block_on(compositor(2).render(&DataUrlLoader, &images, &CompositeState::default()))
                .unwrap();
        assert_eq!(rendered.slots, vec![SlotOutcome::Skipped, SlotOutcome::Photo]);
        assert_eq!(rgba_at(&rendered.pixmap, 105, 85), WHITE);
        assert_eq!(rgba_at(&rendered.pixmap, 105, 235), [0, 255, 0, 255]);
        assert_eq!(rendered.pixmap.height(), 340);
    }

    #[test]
    fn zero_slots_draw_background_and_watermark_only() {
        let state = CompositeState {
            background_color: CssColor::parse("black").unwrap(),
            stickers: Vec::new(),
        };
        let c = compositor(0);
        let rendered = c
            .render(&DataUrlLoader, &[], &state)
            .now_or_never()
            .unwrap()
            .unwrap();
        let pixmap = &rendered.pixmap;

        assert!(rendered.slots.is_empty());
        assert_eq!((pixmap.width(), pixmap.height()), (210, 40));
        assert_eq!(rgba_at(pixmap, 2, 2), [0, 0, 0, 255]);
        // Watermark baseline sits at 40 - 12 = 28, centred on x = 105.
        assert!(inked(pixmap, 80, 14, 130, 30, [0, 0, 0, 255]));
    }

    #[test]
    fn empty_sticker_list_draws_only_watermark_text() {
        let rendered = block_on(compositor(0).render(
            &DataUrlLoader,
            &[],
            &CompositeState::default(),
        ))
        .unwrap();
        // Above the watermark band nothing is drawn.
        assert!(!inked(&rendered.pixmap, 0, 0, 210, 12, WHITE));
        assert!(inked(&rendered.pixmap, 0, 12, 210, 40, WHITE));
    }

    #[test]
    fn stickers_paint_over_photos() {
        let images = vec![png_ref([0, 0, 255, 255])];
        let state = CompositeState {
            background_color: CssColor::white(),
            stickers: vec![StickerPlacement::new("█", Point::new(60.0, 60.0), 32.0)],
        };
        let layout_only = block_on(compositor(1).render(
            &DataUrlLoader,
            &images,
            &CompositeState::default(),
        ))
        .unwrap();
        let with_sticker = block_on(compositor(1).render(&DataUrlLoader, &images, &state)).unwrap();

        let blue = [0, 0, 255, 255];
        assert!(!inked(&layout_only.pixmap, 60, 60, 80, 92, blue));
        assert!(inked(&with_sticker.pixmap, 60, 60, 80, 92, blue));
    }

    #[test]
    fn repeated_renders_are_identical() {
        let images = vec![png_ref([9, 99, 199, 255])];
        let state = CompositeState {
            background_color: CssColor::parse("pink").unwrap(),
            stickers: vec![StickerPlacement::new("★", Point::new(50.0, 50.0), 32.0)],
        };
        let c = compositor(2);
        let a = block_on(c.render(&DataUrlLoader, &images, &state)).unwrap();
        let b = block_on(c.render(&DataUrlLoader, &images, &state)).unwrap();
        assert_eq!(a.pixmap.data(), b.pixmap.data());
    }

    #[test]
    fn oversized_layouts_fail_instead_of_allocating() {
        let c = Compositor::new(
            LayoutConfig::with_photo_count(u32::MAX),
            StripStyle::default(),
            Fonts::embedded().unwrap(),
        );
        let state = CompositeState::default();
        let result = block_on(c.render(&DataUrlLoader, &[], &state));
        assert!(matches!(
            result,
            Err(StripError::Surface { width: 210, height: u32::MAX })
        ));
    }

    #[test]
    fn half_pixel_origin_is_not_snapped() {
        // (211 - 170) / 2 = 20.5: both side columns are half covered.
        let c = Compositor::new(
            LayoutConfig {
                photo_count: 1,
                strip_width: 211,
                ..LayoutConfig::default()
            },
            StripStyle::default(),
            Fonts::embedded().unwrap(),
        );
        let images = vec![png_ref([255, 0, 0, 255])];
        let state = CompositeState::default();
        let rendered = block_on(c.render(&DataUrlLoader, &images, &state)).unwrap();
        let pixmap = &rendered.pixmap;

        let left = rgba_at(pixmap, 20, 85);
        let right = rgba_at(pixmap, 190, 85);
        assert_eq!(left[0], 255);
        assert!((100..=160).contains(&left[1]), "left edge {left:?}");
        assert!(left[1].abs_diff(right[1]) <= 2, "left {left:?} right {right:?}");
        assert_eq!(rgba_at(pixmap, 21, 85), [255, 0, 0, 255]);
        assert_eq!(rgba_at(pixmap, 189, 85), [255, 0, 0, 255]);
        assert_eq!(rgba_at(pixmap, 19, 85), WHITE);
        assert_eq!(rgba_at(pixmap, 191, 85), WHITE);
    }

    /// Loader whose futures never resolve.
    struct StalledLoader;

    impl ImageLoader for StalledLoader {
        fn load(&self, _: &ImageRef) -> impl Future<Output = Result<RgbaImage, StripError>> {
            futures::future::pending()
        }
    }

    #[test]
    fn a_stalled_load_holds_back_completion() {
        let images = vec![png_ref([0, 0, 0, 255])];
        let c = compositor(1);
        let state = CompositeState::default();
        let future = c.render(&StalledLoader, &images, &state);
        assert!(future.now_or_never().is_none());
    }

    #[test]
    fn stalled_loads_are_irrelevant_without_photos() {
        // Only placeholders: the loader is never consulted.
        let c = compositor(2);
        let state = CompositeState::default();
        let future = c.render(&StalledLoader, &[], &state);
        assert!(future.now_or_never().is_some());
    }
}

//! One strip editing session: layout, photos, stickers and the pointer
//! gesture.
//!
//! Every mutation reports whether the strip needs redrawing. The caller
//! owns scheduling: it takes a [`StripEditor::snapshot`] and hands it to
//! a [`Compositor`] render.

use crate::color::CssColor;
use crate::compose::Compositor;
use crate::layout::LayoutConfig;
use crate::session::SessionSnapshot;
use crate::source::ImageRef;
use crate::sticker::{Gesture, StickerPlacement, bottommost_hit, topmost_hit};
use crate::typeface::{Fonts, Typeface};
use crate::types::{CompositeState, Point, StripError, StripStyle};

/// Whether a mutation changed what the strip looks like.
#[must_use = "a requested redraw must be scheduled"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// The composite state changed; render again.
    Requested,
    /// Nothing visible changed.
    Skipped,
}

impl Redraw {
    /// `true` for [`Redraw::Requested`].
    #[must_use]
    pub const fn is_requested(self) -> bool {
        matches!(self, Self::Requested)
    }
}

/// Editing session for one strip page.
#[derive(Debug, Clone)]
pub struct StripEditor {
    layout: LayoutConfig,
    images: Vec<ImageRef>,
    state: CompositeState,
    gesture: Gesture,
    style: StripStyle,
    fonts: Fonts,
}

impl StripEditor {
    /// Create an editor with an explicit layout.
    #[must_use]
    pub fn new(layout: LayoutConfig, images: Vec<ImageRef>, style: StripStyle, fonts: Fonts) -> Self {
        Self {
            layout,
            images,
            state: CompositeState::default(),
            gesture: Gesture::Idle,
            style,
            fonts,
        }
    }

    /// Create an editor from what the previous pages stored.
    #[must_use]
    pub fn from_session(session: &SessionSnapshot, style: StripStyle, fonts: Fonts) -> Self {
        Self::new(
            LayoutConfig::for_session(session),
            session.photos.clone(),
            style,
            fonts,
        )
    }

    /// Slot count and geometry of the strip.
    #[must_use]
    pub const fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Photos in slot order. May be shorter than the slot count.
    #[must_use]
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Current background and stickers.
    #[must_use]
    pub const fn state(&self) -> &CompositeState {
        &self.state
    }

    /// Whether a sticker is being dragged.
    #[must_use]
    pub const fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Copy of the composite state for one render call.
    #[must_use]
    pub fn snapshot(&self) -> CompositeState {
        self.state.clone()
    }

    /// A compositor drawing this session's layout and style.
    #[must_use]
    pub fn compositor(&self) -> Compositor {
        Compositor::new(self.layout, self.style.clone(), self.fonts.clone())
    }

    /// Draw and hit-test stickers with `face` first, keeping the current
    /// sticker faces as fallbacks.
    pub fn set_sticker_face(&mut self, face: Typeface) -> Redraw {
        self.fonts = self.fonts.clone().with_sticker_face(face);
        Redraw::Requested
    }

    /// Change the background fill.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::InvalidColor`] and leaves the state untouched
    /// if `color` is not a recognised CSS color.
    pub fn set_background(&mut self, color: &str) -> Result<Redraw, StripError> {
        self.state.background_color = CssColor::parse(color)?;
        Ok(Redraw::Requested)
    }

    /// Append a sticker at the default position and size.
    pub fn add_sticker(&mut self, symbol: &str) -> Redraw {
        self.state.stickers.push(StickerPlacement::new(
            symbol,
            self.style.sticker_origin,
            self.style.sticker_size,
        ));
        Redraw::Requested
    }

    /// Append a sticker at an explicit position and size.
    pub fn add_sticker_at(&mut self, symbol: &str, origin: Point, font_size: f32) -> Redraw {
        self.state
            .stickers
            .push(StickerPlacement::new(symbol, origin, font_size));
        Redraw::Requested
    }

    /// Pointer down: start dragging the topmost sticker under `p`.
    pub fn press(&mut self, p: Point) -> Redraw {
        if let Some(index) = topmost_hit(&self.state.stickers, p, self.fonts.sticker.as_ref()) {
            let offset = p - self.state.stickers[index].origin();
            tracing::trace!(index, "sticker drag started");
            self.gesture = Gesture::Dragging { index, offset };
        }
        Redraw::Skipped
    }

    /// Pointer move: reposition the dragged sticker, if any.
    pub fn drag_to(&mut self, p: Point) -> Redraw {
        let Gesture::Dragging { index, offset } = self.gesture else {
            return Redraw::Skipped;
        };
        let Some(sticker) = self.state.stickers.get_mut(index) else {
            self.gesture = Gesture::Idle;
            return Redraw::Skipped;
        };
        let origin = p - offset;
        sticker.x = origin.x;
        sticker.y = origin.y;
        Redraw::Requested
    }

    /// Pointer up: end any drag.
    pub fn release(&mut self) -> Redraw {
        self.gesture = Gesture::Idle;
        Redraw::Skipped
    }

    /// Double click: delete the bottommost sticker under `p`.
    pub fn remove_at(&mut self, p: Point) -> Redraw {
        let Some(index) = bottommost_hit(&self.state.stickers, p, self.fonts.sticker.as_ref())
        else {
            return Redraw::Skipped;
        };
        let removed = self.state.stickers.remove(index);
        tracing::trace!(index, symbol = %removed.symbol, "sticker removed");
        self.gesture = Gesture::Idle;
        Redraw::Requested
    }

    /// Back to a white strip with no stickers.
    pub fn reset(&mut self) -> Redraw {
        self.state = CompositeState::default();
        self.gesture = Gesture::Idle;
        Redraw::Requested
    }
}

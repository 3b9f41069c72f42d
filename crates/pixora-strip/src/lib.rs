//! pixora-strip: photo strip compositing and sticker editing (sans-IO).
//!
//! Draws a vertical strip of photo slots onto a pixel surface, with a
//! background fill, emoji stickers the user can place, drag and remove,
//! and a watermark. Also owns the session keys the photobooth pages use
//! to hand photos to the strip page.
//!
//! This crate has **no I/O dependencies**. Photos arrive as data URL
//! strings, the key-value store is a trait, and image loading is an
//! async seam ([`ImageLoader`]) the caller drives. All browser and
//! filesystem interaction lives in `pixora-io` and the binaries.
//!
//! # Rendering
//!
//! ```text
//! StripEditor ──snapshot()──▶ CompositeState ─┐
//!      │                                      ├──▶ Compositor::render ──▶ Pixmap
//!      └──images()──▶ [ImageRef] ── loader ───┘
//! ```

pub mod color;
pub mod compose;
pub mod editor;
pub mod layout;
pub mod session;
pub mod source;
pub mod sticker;
pub mod surface;
pub mod typeface;
pub mod types;

pub use color::CssColor;
pub use compose::{Compositor, Rendered, SlotOutcome};
pub use editor::{Redraw, StripEditor};
pub use layout::LayoutConfig;
pub use session::{KeyValueStore, MemoryStore, SessionSnapshot, SessionStore};
pub use source::{DataUrlLoader, ImageLoader, ImageRef, decode_image};
pub use sticker::{Gesture, PALETTE, StickerBounds, StickerPlacement};
pub use surface::{RenderTicket, StripSurface};
pub use typeface::{Fonts, TextMeasure, Typeface};
pub use types::{CompositeState, Dimensions, Pixmap, Point, RgbaImage, StripError, StripStyle};

//! Presenting rendered strips in a `<canvas>`.

use pixora_strip::Pixmap;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Errors that can occur while drawing to a canvas.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The canvas has no 2D context.
    #[error("canvas has no 2d context")]
    NoContext,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for CanvasError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Resize `canvas` to the strip and copy its pixels in.
///
/// # Errors
///
/// Returns [`CanvasError::NoContext`] if a 2D context cannot be created
/// and [`CanvasError::JsError`] if `ImageData` construction or
/// `putImageData` fails.
pub fn blit(canvas: &HtmlCanvasElement, pixmap: &Pixmap) -> Result<(), CanvasError> {
    if canvas.width() != pixmap.width() {
        canvas.set_width(pixmap.width());
    }
    if canvas.height() != pixmap.height() {
        canvas.set_height(pixmap.height());
    }

    let ctx = canvas
        .get_context("2d")?
        .ok_or(CanvasError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| CanvasError::NoContext)?;

    let rgba = pixora_export::to_rgba_image(pixmap);
    let image_data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(rgba.as_raw().as_slice()),
        pixmap.width(),
        pixmap.height(),
    )?;
    ctx.put_image_data(&image_data, 0.0, 0.0)?;
    Ok(())
}

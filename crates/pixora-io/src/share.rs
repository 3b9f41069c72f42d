//! Native share sheet with a download fallback.
//!
//! Wraps [`navigator.share()`][mdn] for a single image file. Browsers
//! that cannot share files (most desktop browsers) get a regular
//! download instead.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/Navigator/share

use pixora_export::{PNG_MIME, SharePayload};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FilePropertyBag, ShareData};

use crate::download::{DownloadError, trigger_download};

/// How a share request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The share sheet completed.
    Shared,
    /// The user dismissed the share sheet (or the browser refused it).
    Cancelled,
    /// File sharing is unavailable; the file was downloaded instead.
    Downloaded,
}

/// Errors that can occur while sharing.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),

    /// The download fallback failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl From<JsValue> for ShareError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Share a PNG through the system share sheet, or download it.
///
/// A rejected share (user cancel, permission denial) resolves to
/// [`ShareOutcome::Cancelled`] and is only logged.
///
/// # Errors
///
/// Returns [`ShareError::JsError`] if the window is unavailable or the
/// `File` cannot be built, and [`ShareError::Download`] if the fallback
/// download fails.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn share_or_download(
    png: &[u8],
    payload: &SharePayload,
) -> Result<ShareOutcome, ShareError> {
    let window =
        web_sys::window().ok_or_else(|| ShareError::JsError("no global window".into()))?;
    let navigator = window.navigator();

    let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("canShare"))
        .unwrap_or(false)
        && js_sys::Reflect::has(&navigator, &JsValue::from_str("share")).unwrap_or(false);

    if supported {
        let data = share_data(png, payload)?;
        if navigator.can_share_with_data(&data) {
            return Ok(match JsFuture::from(navigator.share_with_data(&data)).await {
                Ok(_) => ShareOutcome::Shared,
                Err(e) => {
                    tracing::info!(reason = %rejection_name(&e), "share cancelled");
                    ShareOutcome::Cancelled
                }
            });
        }
    }

    tracing::debug!("file sharing unavailable, downloading instead");
    trigger_download(png, &payload.filename, PNG_MIME)?;
    Ok(ShareOutcome::Downloaded)
}

fn share_data(png: &[u8], payload: &SharePayload) -> Result<ShareData, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(png));
    let opts = FilePropertyBag::new();
    opts.set_type(PNG_MIME);
    let file = web_sys::File::new_with_u8_array_sequence_and_options(
        &parts,
        &payload.filename,
        &opts,
    )?;

    let data = ShareData::new();
    data.set_files(&js_sys::Array::of1(&file));
    data.set_title(&payload.title);
    data.set_text(&payload.text);
    Ok(data)
}

/// `DOMException` name of a share rejection (`AbortError`,
/// `NotAllowedError`, ...), or its debug form.
fn rejection_name(value: &JsValue) -> String {
    use wasm_bindgen::JsCast;
    value
        .dyn_ref::<web_sys::DomException>()
        .map_or_else(|| format!("{value:?}"), web_sys::DomException::name)
}

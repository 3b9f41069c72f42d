//! Blocking user notifications.

use wasm_bindgen::JsValue;

/// Errors that can occur when showing a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for NotifyError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Show `message` in a modal `alert()`.
///
/// # Errors
///
/// Returns [`NotifyError::JsError`] if there is no window or the alert
/// is suppressed by the browser.
pub fn notify(message: &str) -> Result<(), NotifyError> {
    let window =
        web_sys::window().ok_or_else(|| NotifyError::JsError("no global window".into()))?;
    window.alert_with_message(message)?;
    Ok(())
}

//! `localStorage` backed session store.

use pixora_strip::KeyValueStore;
use wasm_bindgen::JsValue;

/// Errors that can occur when accessing `localStorage`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or unavailable (private browsing, sandboxed
    /// iframe, no window).
    #[error("local storage unavailable")]
    Unavailable,

    /// A browser API call returned an error (e.g. quota exceeded).
    #[error("local storage error: {0}")]
    JsError(String),
}

impl From<JsValue> for StorageError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// The page's `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if there is no window or
    /// storage is disabled.
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = window.local_storage()?.ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.storage.get_item(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        Ok(self.storage.set_item(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        Ok(self.storage.remove_item(key)?)
    }
}

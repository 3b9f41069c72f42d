//! Persistent session state shared between the photobooth pages.
//!
//! The layout page writes a pose count, the capture/upload page writes
//! the list of photos, and the strip page reads both. Values are plain
//! strings in a key-value store (`localStorage` in the browser, a JSON
//! file on the command line), so the encoding here matches what a page
//! script would read and write.

use std::collections::BTreeMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::source::ImageRef;

/// Key holding the JSON array of photo data URLs.
pub const PHOTOS_KEY: &str = "photos";

/// Key holding the chosen number of poses.
pub const POSE_COUNT_KEY: &str = "poseCount";

/// A string key-value store that survives page navigation.
pub trait KeyValueStore {
    /// Error raised by the backing store.
    type Error: std::error::Error;

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// In-memory store. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore(BTreeMap<String, String>);

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.0.remove(key);
        Ok(())
    }
}

/// What the strip page reads at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Captured or uploaded photos, in capture order.
    pub photos: Vec<ImageRef>,
    /// Chosen pose count; `None` when unset, zero, or unparseable.
    pub pose_count: Option<u32>,
}

/// Typed access to the photobooth keys of a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a backing store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the backing store.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Unwrap the backing store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read the session.
    ///
    /// Malformed photo lists are treated as empty (with a warning)
    /// rather than failing the page.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be read.
    pub fn load(&self) -> Result<SessionSnapshot, S::Error> {
        let photos = match self.store.get(PHOTOS_KEY)? {
            Some(json) => serde_json::from_str::<Option<Vec<ImageRef>>>(&json)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring malformed stored photo list");
                    None
                })
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let pose_count = self
            .store
            .get(POSE_COUNT_KEY)?
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|&n| n > 0);
        Ok(SessionSnapshot { photos, pose_count })
    }

    /// Record a layout choice and discard photos from a previous round.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be written.
    pub fn choose_layout(&mut self, poses: u32) -> Result<(), S::Error> {
        self.store.set(POSE_COUNT_KEY, &poses.to_string())?;
        self.store.remove(PHOTOS_KEY)
    }

    /// Replace the stored photos.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the store cannot be written.
    pub fn save_photos(&mut self, photos: &[ImageRef]) -> Result<(), S::Error> {
        // Serializing a list of strings cannot fail.
        let json = serde_json::to_string(photos).unwrap_or_else(|_| "[]".to_owned());
        self.store.set(PHOTOS_KEY, &json)
    }
}

/// Parse the leading decimal integer of `s`, ignoring leading
/// whitespace and trailing junk (`"3 poses"` is 3).
#[must_use]
pub fn parse_leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_with(pairs: &[(&str, &str)]) -> SessionStore<MemoryStore> {
        let mut store = MemoryStore::default();
        for (k, v) in pairs {
            store.set(k, v).unwrap();
        }
        SessionStore::new(store)
    }

    #[test]
    fn empty_store_loads_empty_session() {
        let session = store_with(&[]).load().unwrap();
        assert_eq!(session, SessionSnapshot::default());
    }

    #[test]
    fn photos_and_pose_count_load() {
        let session = store_with(&[
            (PHOTOS_KEY, r#"["data:image/png;base64,AA==","data:image/png;base64,AQ=="]"#),
            (POSE_COUNT_KEY, "3"),
        ])
        .load()
        .unwrap();
        assert_eq!(session.photos.len(), 2);
        assert_eq!(session.photos[1].as_str(), "data:image/png;base64,AQ==");
        assert_eq!(session.pose_count, Some(3));
    }

    #[test]
    fn null_or_malformed_photos_are_empty() {
        for raw in ["null", "{not json", "42"] {
            let session = store_with(&[(PHOTOS_KEY, raw)]).load().unwrap();
            assert!(session.photos.is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn pose_count_uses_leading_integer_and_ignores_zero() {
        let load = |raw: &str| store_with(&[(POSE_COUNT_KEY, raw)]).load().unwrap().pose_count;
        assert_eq!(load("4"), Some(4));
        assert_eq!(load(" 2 poses"), Some(2));
        assert_eq!(load("0"), None);
        assert_eq!(load("abc"), None);
        assert_eq!(load("-3"), None);
    }

    #[test]
    fn choosing_a_layout_clears_photos() {
        let mut store = store_with(&[(PHOTOS_KEY, r#"["data:image/png;base64,AA=="]"#)]);
        store.choose_layout(6).unwrap();
        let session = store.load().unwrap();
        assert!(session.photos.is_empty());
        assert_eq!(session.pose_count, Some(6));
    }

    #[test]
    fn saved_photos_reload_in_order() {
        let mut store = store_with(&[]);
        let photos = vec![
            ImageRef::new("data:image/png;base64,AA=="),
            ImageRef::new("data:image/jpeg;base64,AQ=="),
        ];
        store.save_photos(&photos).unwrap();
        assert_eq!(store.load().unwrap().photos, photos);
        assert_eq!(
            store.inner().get(PHOTOS_KEY).unwrap().unwrap(),
            r#"["data:image/png;base64,AA==","data:image/jpeg;base64,AQ=="]"#
        );
    }

    #[test]
    fn memory_store_serializes_flat() {
        let store = store_with(&[(POSE_COUNT_KEY, "2")]).into_inner();
        assert_eq!(serde_json::to_string(&store).unwrap(), r#"{"poseCount":"2"}"#);
    }
}

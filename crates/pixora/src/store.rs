//! Session store persisted as a flat JSON object on disk.

use std::path::{Path, PathBuf};

use pixora_strip::{KeyValueStore, MemoryStore};

/// Errors reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("cannot read session file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("session file {} is not a JSON object of strings: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write session file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A [`MemoryStore`] mirrored to a JSON file after every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: MemoryStore,
}

impl FileStore {
    /// Load `path`, treating a missing file as an empty store.
    pub fn open(path: &Path) -> Result<Self, FileStoreError> {
        let entries = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| FileStoreError::Parse {
                path: path.to_owned(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no session file yet");
                MemoryStore::default()
            }
            Err(source) => {
                return Err(FileStoreError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Ok(Self {
            path: path.to_owned(),
            entries,
        })
    }

    fn flush(&self) -> Result<(), FileStoreError> {
        let write_err = |source| FileStoreError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(&self.path, json).map_err(write_err)
    }
}

impl KeyValueStore for FileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let Ok(value) = self.entries.get(key);
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        let Ok(()) = self.entries.set(key, value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        let Ok(()) = self.entries.remove(key);
        self.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pixora_strip::session::{PHOTOS_KEY, POSE_COUNT_KEY};

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pixora-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_is_empty() {
        let store = FileStore::open(&scratch("missing.json")).unwrap();
        assert_eq!(store.get(POSE_COUNT_KEY).unwrap(), None);
    }

    #[test]
    fn writes_persist_across_opens() {
        let path = scratch("persist.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set(POSE_COUNT_KEY, "3").unwrap();
        store.set(PHOTOS_KEY, "[]").unwrap();
        store.remove(PHOTOS_KEY).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(POSE_COUNT_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get(PHOTOS_KEY).unwrap(), None);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let path = scratch("garbage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(FileStoreError::Parse { .. })
        ));
    }
}

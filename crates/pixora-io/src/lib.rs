//! pixora-io: Browser I/O for the strip page.
//!
//! Handles `localStorage` session access, canvas presentation, Blob
//! downloads, the Web Share API and blocking alerts. Everything here
//! requires a browser environment (`wasm32-unknown-unknown` target).

pub mod canvas;
pub mod download;
pub mod notify;
pub mod share;
pub mod storage;

pub use canvas::{CanvasError, blit};
pub use download::{DownloadError, trigger_download};
pub use notify::{NotifyError, notify};
pub use share::{ShareError, ShareOutcome, share_or_download};
pub use storage::{LocalStorage, StorageError};

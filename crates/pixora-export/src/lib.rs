//! pixora-export: Pure output encoding for finished strips (sans-IO)
//!
//! Turns a rendered surface into PNG bytes and carries the fixed file
//! name and share text. Delivering those bytes (download, share sheet,
//! file on disk) is left to `pixora-io` and the CLI.

pub mod png;

pub use png::{ExportError, PNG_MIME, STRIP_FILENAME, SharePayload, encode_png, to_rgba_image};

//! crates/ens_io/src/lib.rs
//! I/O boundary of the engine.
//!
//! - `tables`: typed CSV readers for the reference tables and trajectory files.
//! - `layout`: discovery of the input data directory (`ref_YYYY-MM-DD/loc_*.csv`).
//! - `canonical_json`: sorted-key compact JSON + atomic file writes.
//! - `hasher`: SHA-256 over raw bytes, files and canonical JSON values.
//!
//! Every module reports failures through the shared `IoError`.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for ens_io (tables/layout/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...)
    #[error("io/path error: {0}")]
    Path(String),

    /// CSV parse or deserialization failure in a specific file.
    #[error("csv error in {path}: {msg}")]
    Csv { path: String, msg: String },

    /// JSON serialization/deserialization errors.
    #[error("json error: {0}")]
    Json(String),

    /// Required input file or directory missing, or a malformed layout.
    #[error("layout error: {0}")]
    Layout(String),

    /// Hashing-related errors (feature disabled, read failures).
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json(e.to_string())
    }
}

pub mod canonical_json;
#[cfg(feature = "hash")]
pub mod hasher;
pub mod layout;
pub mod tables;

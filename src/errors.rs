//! Error types shared by the SubDB client library and the CLI

use std::path::PathBuf;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SubDbError>;

/// Errors produced by hashing, transport, encoding and settings handling.
///
/// A non-success HTTP status is *not* an error: it comes back inside
/// [`crate::client::ApiResponse`] so callers can branch on it.
#[derive(Debug, thiserror::Error)]
pub enum SubDbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} is too small to hash ({size} bytes, need at least {min})", path.display())]
    FileTooSmall { path: PathBuf, size: u64, min: u64 },

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

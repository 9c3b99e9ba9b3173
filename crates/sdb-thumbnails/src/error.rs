//! Error types for thumbnail generation

use thiserror::Error;

/// Errors produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure reading a BLP or writing a PNG
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The BLP decoder failed on a specific file
    #[error("failed to decode {path}: {reason}")]
    Decode {
        /// Path of the offending BLP file
        path: String,
        /// Underlying decoder error, rendered as text
        reason: String,
    },
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for index building

use thiserror::Error;

/// Errors produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying WDBC codec failure
    #[error(transparent)]
    Codec(#[from] sdb_wdbc::Error),

    /// I/O failure reading sources or persisting an index
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Index JSON was malformed
    #[error("malformed index file: {0}")]
    Malformed(String),
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the edit store

use thiserror::Error;

/// Errors produced by [`crate::EditStore`] operations
#[derive(Debug, Error)]
pub enum Error {
    /// Neither base nor export holds the requested file
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// `file` did not end in `.dbc`
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// `save` was called without records or field definitions
    #[error("missing payload for save")]
    MissingPayload,

    /// `copyToCustom` was called but the base file does not exist
    #[error("base file missing: {0}")]
    BaseMissing(String),

    /// `deleteRecord` referenced an id that is not present
    #[error("record id not found: {0}")]
    IdNotFound(u32),

    /// No bundled schema is registered for this table
    #[error("no schema registered for table: {0}")]
    NoSchema(String),

    /// Underlying codec failure
    #[error(transparent)]
    Codec(#[from] sdb_wdbc::Error),

    /// I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for WDBC parsing, writing, and diffing

use thiserror::Error;

/// Errors produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure while reading or writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first four bytes of the file were not `WDBC`
    #[error("invalid magic signature: expected WDBC, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// The file is shorter than its header declares
    #[error("truncated file: {0}")]
    TruncatedFile(String),

    /// A schema failed validation against a parsed header
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// A record, field, or string reference could not be resolved
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A value could not be coerced to the field's declared type
    #[error("type conversion error: {0}")]
    TypeConversion(String),

    /// One of the two sides of a diff is missing
    #[error("file missing for diff: {0}")]
    FileMissing(String),
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, Error>;

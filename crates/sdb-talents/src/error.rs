//! Error type for the talent repack pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failures from either the JSON-to-Lua deployment or the legacy DBC repack.
#[derive(Debug, Error)]
pub enum Error {
    #[error("reading talent config {path}: {source}")]
    ReadConfig { path: PathBuf, source: std::io::Error },

    #[error("parsing talent config {path}: {source}")]
    ParseConfig { path: PathBuf, source: serde_json::Error },

    #[error("writing Lua deployment to {path}: {source}")]
    WriteLua { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Codec(#[from] sdb_wdbc::Error),

    #[error("legacy DBC talent repack is disabled (see design notes)")]
    RepackDisabled,
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the spell editor

use thiserror::Error;

/// Errors produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// WDBC codec failure reading the `Spell` table
    #[error(transparent)]
    Codec(#[from] sdb_wdbc::Error),

    /// Edit store failure
    #[error(transparent)]
    Store(#[from] sdb_store::Error),

    /// SQL mirror failure
    #[error(transparent)]
    Sql(#[from] turso::Error),

    /// I/O failure (enum header parsing, Lua/JSON files)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No spell with this ID exists in either the DBC or the mirror
    #[error("spell {0} not found")]
    NotFound(u32),

    /// `createFromTemplate` target ID already exists
    #[error("spell {0} already exists")]
    IdAlreadyExists(u32),
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, Error>;

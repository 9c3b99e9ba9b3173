//! Reader/writer for World of Warcraft 3.3.5a WDBC client database files
//!
//! A WDBC file is a fixed 20-byte header, a run of uniform 4-byte-field
//! records, and a NUL-delimited string block. This crate knows nothing
//! about any specific table beyond what the [`registry`] module bundles;
//! every other component builds on [`DbcParser`], [`DbcWriter`], and
//! [`Schema`].

pub mod diff;
pub mod error;
pub mod export;
pub mod header;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod stringblock;
pub mod writer;

pub use diff::{diff_files, DbcDiff, RecordDiff};
pub use error::{Error, Result};
pub use export::{export_to_json, SerializableRecord, SerializableValue};
pub use header::DbcHeader;
pub use parser::{DbcParser, Record, RecordSet, Value};
pub use registry::{registry, LookupSource, SchemaRegistry};
pub use schema::{FieldType, Schema, SchemaField};
pub use stringblock::{StringBlock, StringInterner};
pub use writer::DbcWriter;

#[cfg(feature = "csv_export")]
pub use export::export_to_csv;

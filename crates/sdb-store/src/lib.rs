//! Layered, cached, backed-up store over base and export WDBC directories
//!
//! Reads prefer the export (edited) copy of a table over the read-only
//! base copy; the first write to a table copies base into export and
//! snapshots both directories into a dated backup (§3.4, §3.5).

pub mod backup;
pub mod cache;
pub mod error;
pub mod layers;
pub mod store;

pub use error::{Error, Result};
pub use layers::{Layers, Source};
pub use store::{AddResult, EditStore, FileSummary, ReadResult, SaveStats};

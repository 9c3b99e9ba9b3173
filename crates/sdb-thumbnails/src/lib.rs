//! BLP icon to PNG thumbnail generation, batched and watcher-driven (§4.4)

pub mod engine;
pub mod error;
pub mod watcher;

pub use engine::{generate_all, generate_one, resolve_source, BatchReport, THUMBNAIL_SIZE};
pub use error::{Error, Result};
pub use watcher::ThumbnailWatcher;

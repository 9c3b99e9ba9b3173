//! Whitelisted spell field editor with a SQL mirror overlay (§4.6)

pub mod editable;
pub mod enums;
pub mod error;
pub mod mirror;
pub mod reference;
pub mod service;
pub mod template;

pub use editable::{SpellView, REFERENCE_FIELDS, SECTIONS};
pub use enums::{EnumCache, EnumEntry, ExtractedEnum};
pub use error::{Error, Result};
pub use mirror::SpellMirror;
pub use reference::ReferenceMatch;
pub use service::SpellEditor;

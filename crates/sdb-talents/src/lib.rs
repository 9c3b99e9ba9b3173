//! Talent tree JSON-to-Lua deployment and the legacy DBC repack (§4.7)

pub mod config;
pub mod error;
pub mod lua;
pub mod repack;

pub use config::{load, ClassTrees, Tab, Talent, TalentConfig};
pub use error::{Error, Result};
pub use lua::{deploy, render, render_coords, DeployReport};
pub use repack::{repack_disabled, repack_tab, DisplayCoord, TabGroup, MAX_COLUMNS};

//! Shared staleness tracking for derived indices (§3.3, §4.3)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Current index format version. Bumping this forces every index to
/// rebuild on next load regardless of source mtimes.
pub const INDEX_VERSION: u32 = 1;

/// Build metadata embedded in every derived index file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Format version; an index with a stale version is always rebuilt
    pub version: u32,
    /// Unix seconds when this index was built
    #[serde(rename = "builtAt")]
    pub built_at: u64,
    /// mtimes (unix seconds) of every source file this index depends on
    #[serde(rename = "sourceMtimes")]
    pub source_mtimes: HashMap<String, u64>,
}

impl IndexMeta {
    /// Build fresh metadata for `sources`, stamped `now`
    pub fn new(sources: &[(&str, &Path)], now: u64) -> std::io::Result<Self> {
        let mut source_mtimes = HashMap::new();
        for (name, path) in sources {
            source_mtimes.insert((*name).to_string(), mtime_secs(path)?);
        }
        Ok(Self {
            version: INDEX_VERSION,
            built_at: now,
            source_mtimes,
        })
    }
}

/// Unix-seconds mtime of `path`
pub fn mtime_secs(path: &Path) -> std::io::Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs())
}

/// An index is valid iff its version matches and every recorded source
/// mtime is still >= the source file's current mtime (the source has not
/// changed since the index was built).
pub fn is_fresh(meta: &IndexMeta, sources: &[(&str, &Path)]) -> bool {
    if meta.version != INDEX_VERSION {
        return false;
    }

    sources.iter().all(|(name, path)| {
        let Some(recorded) = meta.source_mtimes.get(*name) else {
            return false;
        };
        mtime_secs(path).is_ok_and(|current| current <= *recorded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_index_matches_unchanged_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Spell.dbc");
        std::fs::write(&path, b"data").unwrap();

        let meta = IndexMeta::new(&[("Spell.dbc", &path)], 1_000).unwrap();
        assert!(is_fresh(&meta, &[("Spell.dbc", &path)]));
    }

    #[test]
    fn stale_version_forces_rebuild() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Spell.dbc");
        std::fs::write(&path, b"data").unwrap();

        let mut meta = IndexMeta::new(&[("Spell.dbc", &path)], 1_000).unwrap();
        meta.version = INDEX_VERSION + 1;
        assert!(!is_fresh(&meta, &[("Spell.dbc", &path)]));
    }

    #[test]
    fn missing_source_entry_is_not_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Spell.dbc");
        std::fs::write(&path, b"data").unwrap();
        let meta = IndexMeta::new(&[], 1_000).unwrap();
        assert!(!is_fresh(&meta, &[("Spell.dbc", &path)]));
    }
}

//! Mtime-invalidated cache of parsed tables (§4.5)

use sdb_wdbc::RecordSet;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

struct Entry {
    mtime: SystemTime,
    record_set: Arc<RecordSet>,
}

/// Caches parsed [`RecordSet`]s by file path, invalidating an entry once
/// the file's mtime moves past what was cached.
#[derive(Default)]
pub struct ParseCache {
    entries: Mutex<HashMap<PathBuf, Entry>>,
}

impl ParseCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached record set for `path` if it is still fresh
    pub fn get(&self, path: &Path) -> Option<Arc<RecordSet>> {
        let mtime = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(path)?;
        (entry.mtime >= mtime).then(|| Arc::clone(&entry.record_set))
    }

    /// Populate the cache entry for `path`
    pub fn put(&self, path: &Path, record_set: Arc<RecordSet>) {
        if let Ok(mtime) = std::fs::metadata(path).and_then(|m| m.modified()) {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.insert(path.to_path_buf(), Entry { mtime, record_set });
        }
    }

    /// Drop any cached entry for `path` (called after a write)
    pub fn invalidate(&self, path: &Path) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::{DbcParser, FieldType, Record, Schema, SchemaField, Value};
    use tempfile::tempdir;

    fn sample_record_set(path: &Path) {
        let schema = Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .with_key_field("ID");
        let bytes = sdb_wdbc::DbcWriter::new(&schema)
            .write(&[Record::new(vec![Value::UInt32(1)])])
            .unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn serves_cached_value_until_file_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Spell.dbc");
        sample_record_set(&path);

        let cache = ParseCache::new();
        assert!(cache.get(&path).is_none());

        let schema = Schema::new("T").field(SchemaField::new("ID", FieldType::UInt32));
        let parsed = DbcParser::parse_bytes(&std::fs::read(&path).unwrap())
            .unwrap()
            .parse_records(Some(&schema))
            .unwrap();
        cache.put(&path, Arc::new(parsed));
        assert!(cache.get(&path).is_some());

        cache.invalidate(&path);
        assert!(cache.get(&path).is_none());
    }
}

//! The edit store (§4.5): layered read, copy-on-write, backup, caching

use crate::cache::ParseCache;
use crate::layers::{Layers, Source};
use crate::{backup, Error, Result};
use sdb_wdbc::{registry, DbcDiff, DbcParser, DbcWriter, Record, RecordSet, Schema, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Summary row returned by [`EditStore::list`]
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// File name, e.g. `Spell.dbc`
    pub name: String,
    /// Whether a base copy exists
    pub has_base: bool,
    /// Whether an export (edited) copy exists
    pub has_export: bool,
    /// Record count from whichever copy is effective
    pub record_count: u32,
    /// Field count from whichever copy is effective
    pub field_count: u32,
}

/// Result of [`EditStore::read`]
pub struct ReadResult {
    /// The decoded table
    pub record_set: Arc<RecordSet>,
    /// Whether a bundled schema exists for this table
    pub has_definition: bool,
    /// Foreign-key lookup maps, keyed by the referencing field name
    pub lookups: HashMap<String, HashMap<u32, String>>,
}

/// Result of [`EditStore::save`]
#[derive(Debug, Clone, Copy)]
pub struct SaveStats {
    /// Records written
    pub record_count: u32,
    /// Fields per record written
    pub field_count: u32,
    /// Bytes per record
    pub record_size: u32,
    /// Size of the written string block
    pub string_block_size: u32,
}

/// Result of [`EditStore::add_record`]
pub struct AddResult {
    /// Auto-assigned id of the new record
    pub id: u32,
    /// Position of the new record within the table
    pub position: usize,
}

/// Layered, cached, backed-up store over base and export WDBC directories
pub struct EditStore {
    layers: Layers,
    backups_root: PathBuf,
    cache: ParseCache,
}

impl EditStore {
    /// Point the store at `base`, `export`, and `backups` directories
    pub fn new(
        base: impl Into<PathBuf>,
        export: impl Into<PathBuf>,
        backups: impl Into<PathBuf>,
    ) -> Self {
        Self {
            layers: Layers::new(base, export),
            backups_root: backups.into(),
            cache: ParseCache::new(),
        }
    }

    fn require_dbc_extension(name: &str) -> Result<()> {
        if name.to_ascii_lowercase().ends_with(".dbc") {
            Ok(())
        } else {
            Err(Error::InvalidFilename(name.to_string()))
        }
    }

    fn table_name(name: &str) -> &str {
        name.strip_suffix(".dbc").unwrap_or(name)
    }

    fn schema_for(name: &str) -> Option<&'static Schema> {
        registry().get(Self::table_name(name))
    }

    fn load(&self, path: &Path, schema: Option<&Schema>) -> Result<Arc<RecordSet>> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached);
        }

        let bytes = std::fs::read(path)?;
        let record_set = Arc::new(DbcParser::parse_bytes(&bytes)?.parse_records(schema)?);
        self.cache.put(path, Arc::clone(&record_set));
        Ok(record_set)
    }

    /// List every `.dbc` visible through either layer with header summary
    pub fn list(&self) -> Result<Vec<FileSummary>> {
        self.layers
            .list_names()
            .into_iter()
            .map(|name| {
                let has_base = self.layers.has_base(&name);
                let has_export = self.layers.has_export(&name);
                let path = self
                    .layers
                    .resolve(&name, Source::Auto)
                    .expect("listed name resolves through one of the layers");
                let bytes = std::fs::read(&path)?;
                let header = DbcParser::parse_bytes(&bytes)?.header().clone();
                Ok(FileSummary {
                    name,
                    has_base,
                    has_export,
                    record_count: header.record_count,
                    field_count: header.field_count,
                })
            })
            .collect()
    }

    /// Read `file` through the layering, building foreign-key lookup maps
    /// for every field with a `ref_table` hint.
    pub fn read(&self, file: &str, source: Source) -> Result<ReadResult> {
        Self::require_dbc_extension(file)?;
        let path = self
            .layers
            .resolve(file, source)
            .ok_or_else(|| Error::FileNotFound(file.to_string()))?;

        let schema = Self::schema_for(file);
        let record_set = self.load(&path, schema)?;
        let lookups = schema
            .map(|s| self.build_lookups(s))
            .unwrap_or_default();

        Ok(ReadResult {
            record_set,
            has_definition: schema.is_some(),
            lookups,
        })
    }

    fn build_lookups(&self, schema: &Schema) -> HashMap<String, HashMap<u32, String>> {
        schema
            .fields
            .iter()
            .filter_map(|field| {
                let ref_table = field.ref_table.as_ref()?;
                let source = registry().lookup_source(ref_table)?;
                let map = self.lookup_table(source.file, source.name_field)?;
                Some((field.name.clone(), map))
            })
            .collect()
    }

    fn lookup_table(&self, file: &str, name_field: &str) -> Option<HashMap<u32, String>> {
        let path = self.layers.resolve(file, Source::Auto)?;
        let schema = Self::schema_for(file)?;
        let record_set = self.load(&path, Some(schema)).ok()?;
        let key_index = record_set.key_field_index()?;
        let name_index = record_set
            .fields()
            .iter()
            .position(|f| f.name == name_field)?;

        Some(
            record_set
                .records()
                .iter()
                .filter_map(|record| {
                    let key = record.get(key_index)?.as_key()?;
                    let name = record.get(name_index)?.display();
                    Some((key, name))
                })
                .collect(),
        )
    }

    /// Write `records` to export for `file`, creating the `.bak` and daily
    /// backup if this is the table's first edit.
    pub fn save(&self, file: &str, records: &[Record]) -> Result<SaveStats> {
        Self::require_dbc_extension(file)?;
        if records.is_empty() {
            return Err(Error::MissingPayload);
        }

        let schema = Self::schema_for(file).ok_or_else(|| Error::NoSchema(file.to_string()))?;

        backup::ensure_daily_backup(&self.backups_root, &self.layers)?;

        let export_path = self.layers.export_path(file);
        if !export_path.exists() {
            if let Some(base_path) = self.layers.resolve(file, Source::Base) {
                std::fs::create_dir_all(export_path.parent().unwrap())?;
                let bak_path = export_path.with_extension("dbc.bak");
                if !bak_path.exists() {
                    std::fs::copy(&base_path, &bak_path)?;
                }
            }
        }

        let bytes = DbcWriter::new(schema).write(records)?;
        atomic_write(&export_path, &bytes)?;
        self.cache.invalidate(&export_path);

        let header = DbcParser::parse_bytes(&bytes)?.header().clone();
        Ok(SaveStats {
            record_count: header.record_count,
            field_count: header.field_count,
            record_size: header.record_size,
            string_block_size: header.string_block_size,
        })
    }

    /// Copy `file` from base into export, establishing an export copy
    /// without changing any values.
    pub fn copy_to_custom(&self, file: &str) -> Result<()> {
        Self::require_dbc_extension(file)?;
        let base_path = self
            .layers
            .resolve(file, Source::Base)
            .ok_or_else(|| Error::BaseMissing(file.to_string()))?;
        let export_path = self.layers.export_path(file);
        std::fs::create_dir_all(export_path.parent().unwrap())?;
        std::fs::copy(base_path, export_path)?;
        Ok(())
    }

    /// Diff the base and export copies of `file`
    pub fn diff(&self, file: &str) -> Result<DbcDiff> {
        Self::require_dbc_extension(file)?;
        let schema = Self::schema_for(file).ok_or_else(|| Error::NoSchema(file.to_string()))?;
        let base_path = self.layers.base_path(file);
        let export_path = self.layers.export_path(file);
        Ok(sdb_wdbc::diff_files(schema, &base_path, &export_path)?)
    }

    /// Append `row` to `file`, auto-assigning its key field to `max + 1`
    pub fn add_record(&self, file: &str, mut row: Record) -> Result<AddResult> {
        let read = self.read(file, Source::Auto)?;
        let schema = Self::schema_for(file).ok_or_else(|| Error::NoSchema(file.to_string()))?;
        let key_index = schema
            .key_field_index
            .ok_or_else(|| Error::NoSchema(file.to_string()))?;

        let max_id = read
            .record_set
            .records()
            .iter()
            .filter_map(|r| r.get(key_index).and_then(Value::as_key))
            .max()
            .unwrap_or(0);
        let new_id = max_id + 1;

        let mut values = row.values().to_vec();
        if let Some(slot) = values.get_mut(key_index) {
            *slot = Value::UInt32(new_id);
        }
        row = Record::new(values);

        let mut records: Vec<Record> = read.record_set.records().to_vec();
        records.push(row);
        let position = records.len() - 1;
        self.save(file, &records)?;

        Ok(AddResult {
            id: new_id,
            position,
        })
    }

    /// Remove the record keyed by `id` from `file`, compacting the table
    pub fn delete_record(&self, file: &str, id: u32) -> Result<usize> {
        let read = self.read(file, Source::Auto)?;
        let schema = Self::schema_for(file).ok_or_else(|| Error::NoSchema(file.to_string()))?;
        let key_index = schema
            .key_field_index
            .ok_or_else(|| Error::NoSchema(file.to_string()))?;

        let mut records: Vec<Record> = read.record_set.records().to_vec();
        let position = records
            .iter()
            .position(|r| r.get(key_index).and_then(Value::as_key) == Some(id))
            .ok_or(Error::IdNotFound(id))?;
        records.remove(position);

        let remaining = records.len();
        self.save(file, &records)?;
        Ok(remaining)
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(path.parent().unwrap())?;
    let tmp_path = path.with_extension("dbc.tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::FieldType;
    use tempfile::tempdir;

    fn spell_bytes(records: &[Record]) -> Vec<u8> {
        let schema = registry().get("Spell").unwrap();
        DbcWriter::new(schema).write(records).unwrap()
    }

    fn spell_record(id: u32, name: &str) -> Record {
        let schema = registry().get("Spell").unwrap();
        let mut values = vec![Value::UInt32(0); schema.declared_field_count()];
        values[0] = Value::UInt32(id);
        values[1] = Value::String(name.to_string());
        Record::new(values)
    }

    fn setup() -> (tempfile::TempDir, EditStore) {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        let backups = dir.path().join("backups");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();

        let records = vec![spell_record(1, "Fireball"), spell_record(2, "Frostbolt")];
        std::fs::write(base.join("Spell.dbc"), spell_bytes(&records)).unwrap();

        let store = EditStore::new(base, export, backups);
        (dir, store)
    }

    #[test]
    fn list_reports_base_only_file() {
        let (_dir, store) = setup();
        let summary = store.list().unwrap();
        let spell = summary.iter().find(|f| f.name == "Spell.dbc").unwrap();
        assert!(spell.has_base);
        assert!(!spell.has_export);
        assert_eq!(spell.record_count, 2);
    }

    #[test]
    fn save_creates_export_copy_and_backup() {
        let (dir, store) = setup();
        let records = vec![spell_record(1, "Fireball Rank 2"), spell_record(2, "Frostbolt")];
        store.save("Spell.dbc", &records).unwrap();

        assert!(dir.path().join("export").join("Spell.dbc").exists());
        assert!(dir.path().join("export").join("Spell.dbc.bak").exists());

        let read = store.read("Spell.dbc", Source::Auto).unwrap();
        let name = read.record_set.get(0).unwrap().get(1).unwrap();
        assert_eq!(name, &Value::String("Fireball Rank 2".to_string()));
    }

    #[test]
    fn add_record_assigns_next_id() {
        let (_dir, store) = setup();
        let added = store.add_record("Spell.dbc", spell_record(0, "Pyroblast")).unwrap();
        assert_eq!(added.id, 3);
        assert_eq!(added.position, 2);
    }

    #[test]
    fn delete_record_compacts_table() {
        let (_dir, store) = setup();
        let remaining = store.delete_record("Spell.dbc", 1).unwrap();
        assert_eq!(remaining, 1);
        let read = store.read("Spell.dbc", Source::Auto).unwrap();
        assert!(read.record_set.get_by_key(1).is_none());
        assert!(read.record_set.get_by_key(2).is_some());
    }

    #[test]
    fn delete_record_missing_id_errors() {
        let (_dir, store) = setup();
        assert!(matches!(
            store.delete_record("Spell.dbc", 999),
            Err(Error::IdNotFound(999))
        ));
    }

    #[test]
    fn rejects_non_dbc_filenames() {
        let (_dir, store) = setup();
        assert!(matches!(
            store.read("Spell.json", Source::Auto),
            Err(Error::InvalidFilename(_))
        ));
    }
}

//! Structural diffing between two WDBC files of the same schema

use crate::{Error, Result, Schema, SchemaField, Value};
use std::path::Path;

/// One record's worth of field-by-field changes
#[derive(Debug, Clone)]
pub struct RecordDiff {
    /// Value of the key field for this record
    pub key: u32,
    /// `(field name, old value, new value)` for every cell that differs
    pub changed_fields: Vec<(String, String, String)>,
}

/// The result of comparing two tables keyed on their schema's key field
#[derive(Debug, Clone, Default)]
pub struct DbcDiff {
    /// Records present in both files with at least one changed cell
    pub modified: Vec<RecordDiff>,
    /// Keys present only in the new file
    pub added: Vec<u32>,
    /// Keys present only in the old file
    pub removed: Vec<u32>,
}

impl DbcDiff {
    /// Whether anything changed at all
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two WDBC files on disk under `schema`, keyed on its declared key
/// field (§4.3). Both files must exist; a missing side is reported as
/// [`Error::FileMissing`] rather than treated as an empty table.
pub fn diff_files(schema: &Schema, old_path: &Path, new_path: &Path) -> Result<DbcDiff> {
    if !old_path.exists() {
        return Err(Error::FileMissing(old_path.display().to_string()));
    }
    if !new_path.exists() {
        return Err(Error::FileMissing(new_path.display().to_string()));
    }

    let old_bytes = std::fs::read(old_path)?;
    let new_bytes = std::fs::read(new_path)?;

    let old_records = crate::DbcParser::parse_bytes(&old_bytes)?.parse_records(Some(schema))?;
    let new_records = crate::DbcParser::parse_bytes(&new_bytes)?.parse_records(Some(schema))?;

    let key_index = schema
        .key_field_index
        .ok_or_else(|| Error::SchemaValidation(format!("schema {} has no key field", schema.name)))?;

    Ok(diff_record_sets(
        &old_records,
        &new_records,
        old_records.fields(),
        key_index,
    ))
}

fn diff_record_sets(
    old: &crate::RecordSet,
    new: &crate::RecordSet,
    fields: &[SchemaField],
    key_index: usize,
) -> DbcDiff {
    let mut diff = DbcDiff::default();

    for old_record in old.records() {
        let Some(key) = old_record.get(key_index).and_then(Value::as_key) else {
            continue;
        };

        match new.get_by_key(key) {
            None => diff.removed.push(key),
            Some(new_record) => {
                let changed_fields: Vec<(String, String, String)> = fields
                    .iter()
                    .enumerate()
                    .filter_map(|(i, field)| {
                        let old_value = old_record.get(i)?;
                        let new_value = new_record.get(i)?;
                        (old_value != new_value).then(|| {
                            (field.name.clone(), old_value.display(), new_value.display())
                        })
                    })
                    .collect();

                if !changed_fields.is_empty() {
                    diff.modified.push(RecordDiff { key, changed_fields });
                }
            }
        }
    }

    for new_record in new.records() {
        if let Some(key) = new_record.get(key_index).and_then(Value::as_key) {
            if old.get_by_key(key).is_none() {
                diff.added.push(key);
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::DbcWriter;
    use crate::{FieldType, Record};
    use tempfile::tempdir;

    fn schema() -> Schema {
        Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String))
            .with_key_field("ID")
    }

    #[test]
    fn detects_added_removed_and_modified_records() {
        let schema = schema();
        let dir = tempdir().unwrap();
        let old_path = dir.path().join("old.dbc");
        let new_path = dir.path().join("new.dbc");

        let old_records = vec![
            Record::new(vec![Value::UInt32(1), Value::String("Frost Nova".into())]),
            Record::new(vec![Value::UInt32(2), Value::String("Gone Soon".into())]),
        ];
        let new_records = vec![
            Record::new(vec![Value::UInt32(1), Value::String("Frost Nova Rank 2".into())]),
            Record::new(vec![Value::UInt32(3), Value::String("Brand New".into())]),
        ];

        std::fs::write(&old_path, DbcWriter::new(&schema).write(&old_records).unwrap()).unwrap();
        std::fs::write(&new_path, DbcWriter::new(&schema).write(&new_records).unwrap()).unwrap();

        let diff = diff_files(&schema, &old_path, &new_path).unwrap();
        assert_eq!(diff.added, vec![3]);
        assert_eq!(diff.removed, vec![2]);
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified[0].key, 1);
        assert_eq!(diff.modified[0].changed_fields[0].0, "Name");
    }

    #[test]
    fn missing_file_reports_file_missing() {
        let schema = schema();
        let dir = tempdir().unwrap();
        let result = diff_files(&schema, &dir.path().join("nope.dbc"), &dir.path().join("also-nope.dbc"));
        assert!(matches!(result, Err(Error::FileMissing(_))));
    }
}

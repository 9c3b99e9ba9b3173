//! Reference-field search endpoint (§4.6 "Reference resolution")

use crate::editable::REFERENCE_FIELDS;
use crate::{Error, Result};
use sdb_store::{EditStore, Source};
use sdb_wdbc::{registry, Value};
use serde::{Deserialize, Serialize};

/// One candidate returned by [`search`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceMatch {
    /// Referenced ID
    pub id: u32,
    /// Human label, `COALESCE(NULLIF(Name,''), CONCAT('<Table> ', ID))`
    pub label: String,
}

/// Search the table referenced by `field` (one of [`REFERENCE_FIELDS`]) for
/// IDs whose decimal string starts with `prefix`, up to `limit` results.
/// Fields with no registered reference table (no bundled schema covers
/// their target) return an empty list rather than failing.
pub fn search(store: &EditStore, field: &str, prefix: &str, limit: usize) -> Result<Vec<ReferenceMatch>> {
    if !REFERENCE_FIELDS.contains(&field) {
        return Err(Error::NotFound(0));
    }

    let schema = registry().get("Spell").expect("Spell schema is bundled");
    let Some(ref_table) = schema
        .fields
        .iter()
        .find(|f| f.name == field)
        .and_then(|f| f.ref_table.clone())
    else {
        return Ok(Vec::new());
    };
    let Some(source) = registry().lookup_source(&ref_table) else {
        return Ok(Vec::new());
    };

    let read = store.read(source.file, Source::Auto)?;
    let fields = read.record_set.fields();
    let Some(key_index) = read.record_set.key_field_index() else {
        return Ok(Vec::new());
    };
    let name_index = fields.iter().position(|f| f.name == source.name_field);

    let mut matches: Vec<ReferenceMatch> = read
        .record_set
        .records()
        .iter()
        .filter_map(|record| {
            let id = record.get(key_index)?.as_key()?;
            if !prefix.is_empty() && !id.to_string().starts_with(prefix) {
                return None;
            }
            let label = name_index
                .and_then(|i| record.get(i))
                .map(Value::display)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("{ref_table} {id}"));
            Some(ReferenceMatch { id, label })
        })
        .take(limit)
        .collect();
    matches.sort_by_key(|m| m.id);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::{registry as wdbc_registry, DbcWriter, Record};

    fn setup() -> (tempfile::TempDir, EditStore) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir_all(&base).unwrap();

        let icon_schema = wdbc_registry().get("SpellIcon").unwrap();
        let icons = vec![
            Record::new(vec![Value::UInt32(135), Value::String(r"Interface\Icons\Spell_Fire_Flamebolt".into())]),
            Record::new(vec![Value::UInt32(1350), Value::String(String::new())]),
        ];
        std::fs::write(
            base.join("SpellIcon.dbc"),
            DbcWriter::new(icon_schema).write(&icons).unwrap(),
        )
        .unwrap();

        let store = EditStore::new(base, dir.path().join("export"), dir.path().join("backups"));
        (dir, store)
    }

    #[test]
    fn finds_icon_by_numeric_prefix() {
        let (_dir, store) = setup();
        let matches = search(&store, "SpellIconID", "13", 10).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].label, r"Interface\Icons\Spell_Fire_Flamebolt");
    }

    #[test]
    fn falls_back_to_generic_label_when_name_is_blank() {
        let (_dir, store) = setup();
        let matches = search(&store, "SpellIconID", "1350", 10).unwrap();
        assert_eq!(matches[0].label, "SpellIcon 1350");
    }

    #[test]
    fn unresolvable_field_returns_empty() {
        let (_dir, store) = setup();
        let matches = search(&store, "SpellVisual1", "", 10).unwrap();
        assert!(matches.is_empty());
    }
}

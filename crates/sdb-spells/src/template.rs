//! Create-from-template (§4.6)

use crate::editable::{field_value, SECTIONS};
use crate::mirror::SpellMirror;
use crate::{Error, Result};
use sdb_store::{EditStore, Source};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Clone `template_id` into a brand-new `new_id`, applying `patch` on top
/// of the copied fields. `new_id` must not already carry a mirror row.
pub async fn create_from_template(
    store: &EditStore,
    mirror: &SpellMirror,
    template_id: u32,
    new_id: u32,
    patch: &BTreeMap<String, Json>,
) -> Result<()> {
    if mirror.exists(new_id).await? {
        return Err(Error::IdAlreadyExists(new_id));
    }

    let read = store.read("Spell.dbc", Source::Auto)?;
    let record = read
        .record_set
        .get_by_key(template_id)
        .ok_or(Error::NotFound(template_id))?;
    let fields = read.record_set.fields();

    let mut full_patch: BTreeMap<String, Json> = SECTIONS
        .iter()
        .flat_map(|(_, names)| names.iter())
        .filter(|name| **name != "ID")
        .filter_map(|name| field_value(record, fields, name).map(|v| ((*name).to_string(), v)))
        .collect();
    full_patch.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));

    mirror.apply_patch(new_id, &full_patch).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::{registry, DbcWriter, Record, Value};

    fn spell_record(id: u32, name: &str) -> Record {
        let schema = registry().get("Spell").unwrap();
        let mut values = vec![Value::UInt32(0); schema.declared_field_count()];
        values[0] = Value::UInt32(id);
        values[1] = Value::String(name.to_string());
        Record::new(values)
    }

    fn setup_store(dir: &std::path::Path) -> EditStore {
        let base = dir.join("base");
        let export = dir.join("export");
        let backups = dir.join("backups");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();

        let schema = registry().get("Spell").unwrap();
        let records = vec![spell_record(133, "Fireball")];
        std::fs::write(
            base.join("Spell.dbc"),
            DbcWriter::new(schema).write(&records).unwrap(),
        )
        .unwrap();

        EditStore::new(base, export, backups)
    }

    #[tokio::test]
    async fn clones_template_and_applies_patch() {
        let dir = tempfile::tempdir().unwrap();
        let store = setup_store(dir.path());
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();

        let mut patch = BTreeMap::new();
        patch.insert("SpellName".to_string(), Json::String("Greater Fireball".to_string()));
        create_from_template(&store, &mirror, 133, 900_001, &patch)
            .await
            .unwrap();

        let read_back = mirror.get_patch(900_001).await.unwrap();
        assert_eq!(
            read_back["SpellName"],
            Json::String("Greater Fireball".to_string())
        );
    }

    #[tokio::test]
    async fn rejects_existing_target_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = setup_store(dir.path());
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();

        let mut first = BTreeMap::new();
        first.insert("SpellName".to_string(), Json::String("A".to_string()));
        mirror.apply_patch(900_002, &first).await.unwrap();

        let result = create_from_template(&store, &mirror, 133, 900_002, &BTreeMap::new()).await;
        assert!(matches!(result, Err(Error::IdAlreadyExists(900_002))));
    }
}

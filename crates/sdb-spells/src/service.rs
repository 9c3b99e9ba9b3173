//! Ties the edit store, SQL mirror, and reference search into one API (§4.6)

use crate::editable::{self, SpellView};
use crate::mirror::SpellMirror;
use crate::reference::{self, ReferenceMatch};
use crate::template;
use crate::{Error, Result};
use sdb_store::{EditStore, Source};
use sdb_wdbc::{registry, Value};
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashMap};

/// High-level spell editor combining the DBC-backed edit store with the
/// SQL mirror overlay.
pub struct SpellEditor {
    store: EditStore,
    mirror: SpellMirror,
}

impl SpellEditor {
    /// Wrap an already-open store and mirror
    pub fn new(store: EditStore, mirror: SpellMirror) -> Self {
        Self { store, mirror }
    }

    /// Read `id` through the editable-fields projection, with the mirror
    /// overlaid on top of the DBC row and `icon_lookup` (the spell-icon
    /// index) resolving the display icon name.
    pub async fn read(&self, id: u32, icon_lookup: Option<&HashMap<String, String>>) -> Result<SpellView> {
        let read = self.store.read("Spell.dbc", Source::Auto)?;
        let record = read.record_set.get_by_key(id).ok_or(Error::NotFound(id))?;
        let fields = read.record_set.fields();
        let patch = self.mirror.get_patch(id).await?;
        let icon_name = icon_lookup.and_then(|map| map.get(&id.to_string()).cloned());
        Ok(editable::project(id, record, fields, &patch, icon_name))
    }

    /// Patch `id`'s editable fields in the mirror
    pub async fn edit(&self, id: u32, patch: &BTreeMap<String, Json>) -> Result<()> {
        self.mirror.apply_patch(id, patch).await.map_err(Error::from)
    }

    /// `suggestFreeId` over the live max of DBC IDs and the mirror
    pub async fn suggest_free_id(&self) -> Result<u32> {
        let read = self.store.read("Spell.dbc", Source::Auto)?;
        let schema = registry().get("Spell").expect("Spell schema is bundled");
        let key_index = schema.key_field_index.expect("Spell schema declares a key field");
        let max_dbc_id = read
            .record_set
            .records()
            .iter()
            .filter_map(|r| r.get(key_index).and_then(Value::as_key))
            .max()
            .unwrap_or(0);
        self.mirror.suggest_free_id(max_dbc_id).await.map_err(Error::from)
    }

    /// Clone `template_id` into `new_id`, applying `patch`
    pub async fn create_from_template(
        &self,
        template_id: u32,
        new_id: u32,
        patch: &BTreeMap<String, Json>,
    ) -> Result<()> {
        template::create_from_template(&self.store, &self.mirror, template_id, new_id, patch).await
    }

    /// Search the table referenced by `field` for IDs matching `prefix`
    pub fn search_reference(&self, field: &str, prefix: &str, limit: usize) -> Result<Vec<ReferenceMatch>> {
        reference::search(&self.store, field, prefix, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::{registry as wdbc_registry, DbcWriter, Record};

    fn spell_record(id: u32, name: &str) -> Record {
        let schema = wdbc_registry().get("Spell").unwrap();
        let mut values = vec![Value::UInt32(0); schema.declared_field_count()];
        values[0] = Value::UInt32(id);
        values[1] = Value::String(name.to_string());
        Record::new(values)
    }

    async fn setup() -> (tempfile::TempDir, SpellEditor) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir_all(&base).unwrap();

        let schema = wdbc_registry().get("Spell").unwrap();
        let records = vec![spell_record(133, "Fireball")];
        std::fs::write(base.join("Spell.dbc"), DbcWriter::new(schema).write(&records).unwrap()).unwrap();

        let store = EditStore::new(base, dir.path().join("export"), dir.path().join("backups"));
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();
        (dir, SpellEditor::new(store, mirror))
    }

    #[tokio::test]
    async fn read_reflects_edit_without_touching_dbc() {
        let (dir, editor) = setup().await;

        let mut patch = BTreeMap::new();
        patch.insert("SpellName".to_string(), Json::String("Pyroblast".to_string()));
        editor.edit(133, &patch).await.unwrap();

        let view = editor.read(133, None).await.unwrap();
        assert_eq!(view.name, "Pyroblast");
        assert!(!dir.path().join("export").join("Spell.dbc").exists());
    }

    #[tokio::test]
    async fn suggest_free_id_respects_existing_dbc_rows() {
        let (_dir, editor) = setup().await;
        let id = editor.suggest_free_id().await.unwrap();
        assert_eq!(id, 900_000);
    }
}

//! spell-icon index: `spellId → iconBaseName` (§4.3)

use crate::meta::IndexMeta;
use crate::Result;
use sdb_wdbc::{registry, DbcParser, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Persisted shape of `spell-icon-index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellIconIndex {
    /// Build metadata
    pub meta: IndexMeta,
    /// `spellId → iconBaseName`
    pub index: HashMap<String, String>,
}

/// Lowercase, extension-stripped, directory-stripped icon base name
///
/// `Interface\Icons\Spell_Fire_Flamebolt` → `spell_fire_flamebolt`
pub fn normalize_icon_path(raw: &str) -> String {
    let forward = raw.replace('\\', "/");
    let base = forward.rsplit('/').next().unwrap_or(&forward);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    stem.to_ascii_lowercase()
}

/// Build the spell-icon index by joining `Spell.dbc.SpellIconID` against
/// `SpellIcon.dbc.IconPath`. Rows referencing a non-existent icon id are
/// omitted.
pub fn build(spell_path: &Path, spell_icon_path: &Path, now: u64) -> Result<SpellIconIndex> {
    let spell_schema = registry().get("Spell").expect("Spell schema is bundled");
    let icon_schema = registry()
        .get("SpellIcon")
        .expect("SpellIcon schema is bundled");

    let spell_bytes = std::fs::read(spell_path)?;
    let spell_records = DbcParser::parse_bytes(&spell_bytes)?.parse_records(Some(spell_schema))?;

    let icon_bytes = std::fs::read(spell_icon_path)?;
    let icon_records =
        DbcParser::parse_bytes(&icon_bytes)?.parse_records(Some(icon_schema))?;

    let icon_index = icon_schema
        .fields
        .iter()
        .position(|f| f.name == "IconPath")
        .expect("SpellIcon schema declares IconPath");
    let icon_key_index = icon_schema.key_field_index.expect("SpellIcon has a key field");

    let id_index = spell_schema
        .fields
        .iter()
        .position(|f| f.name == "ID")
        .expect("Spell schema declares ID");
    let spell_icon_id_index = spell_schema
        .fields
        .iter()
        .position(|f| f.name == "SpellIconID")
        .expect("Spell schema declares SpellIconID");

    let icon_paths: HashMap<u32, String> = icon_records
        .records()
        .iter()
        .filter_map(|record| {
            let key = record.get(icon_key_index)?.as_key()?;
            let Value::String(path) = record.get(icon_index)? else {
                return None;
            };
            Some((key, path.clone()))
        })
        .collect();

    let index = spell_records
        .records()
        .iter()
        .filter_map(|record| {
            let spell_id = record.get(id_index)?.as_key()?;
            let icon_id = record.get(spell_icon_id_index)?.as_key()?;
            let path = icon_paths.get(&icon_id)?;
            Some((spell_id.to_string(), normalize_icon_path(path)))
        })
        .collect();

    let meta = IndexMeta::new(
        &[
            ("Spell.dbc", spell_path),
            ("SpellIcon.dbc", spell_icon_path),
        ],
        now,
    )?;

    Ok(SpellIconIndex { meta, index })
}

/// Load the index from disk if it is fresh, else rebuild and persist it
pub fn load_or_build(
    index_path: &Path,
    spell_path: &Path,
    spell_icon_path: &Path,
    now: u64,
) -> Result<SpellIconIndex> {
    if let Ok(bytes) = std::fs::read(index_path) {
        if let Ok(existing) = serde_json::from_slice::<SpellIconIndex>(&bytes) {
            if crate::meta::is_fresh(
                &existing.meta,
                &[
                    ("Spell.dbc", spell_path),
                    ("SpellIcon.dbc", spell_icon_path),
                ],
            ) {
                return Ok(existing);
            }
        }
    }

    let built = build(spell_path, spell_icon_path, now)?;
    persist(index_path, &built)?;
    Ok(built)
}

fn persist(index_path: &Path, index: &SpellIconIndex) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(index).map_err(|e| crate::Error::Malformed(e.to_string()))?;
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = index_path.with_extension("json.tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, index_path)?;
    Ok(())
}

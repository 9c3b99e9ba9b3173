//! icon-manifest index: per-icon `{name, hasThumbnail, inDbc, dbcId}` (§3.3)

use crate::icon_list::IconList;
use crate::meta::IndexMeta;
use crate::Result;
use sdb_wdbc::{registry, DbcParser, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One row of the icon manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconManifestEntry {
    /// Icon base name (no extension, no directory)
    pub name: String,
    /// Whether a generated thumbnail exists for this icon
    #[serde(rename = "hasThumbnail")]
    pub has_thumbnail: bool,
    /// Whether `SpellIcon.dbc` references this icon
    #[serde(rename = "inDbc")]
    pub in_dbc: bool,
    /// The `SpellIcon.dbc` row id, if `inDbc`
    #[serde(rename = "dbcId")]
    pub dbc_id: Option<u32>,
}

/// Persisted shape of `icon-manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconManifest {
    /// Build metadata
    pub meta: IndexMeta,
    /// One entry per icon in the icon list
    pub entries: Vec<IconManifestEntry>,
}

/// Build the icon manifest by joining `icon_list` against `SpellIcon.dbc`
/// and the thumbnail directory's contents.
pub fn build(
    icon_list: &IconList,
    thumbnails_dir: &Path,
    spell_icon_path: &Path,
    now: u64,
) -> Result<IconManifest> {
    let schema = registry().get("SpellIcon").expect("SpellIcon schema is bundled");
    let bytes = std::fs::read(spell_icon_path)?;
    let record_set = DbcParser::parse_bytes(&bytes)?.parse_records(Some(schema))?;

    let id_index = schema.key_field_index.expect("SpellIcon has a key field");
    let path_index = schema
        .fields
        .iter()
        .position(|f| f.name == "IconPath")
        .expect("SpellIcon schema declares IconPath");

    let by_name: HashMap<String, u32> = record_set
        .records()
        .iter()
        .filter_map(|record| {
            let id = record.get(id_index)?.as_key()?;
            let Value::String(path) = record.get(path_index)? else {
                return None;
            };
            Some((crate::spell_icon::normalize_icon_path(path), id))
        })
        .collect();

    let entries = icon_list
        .files
        .iter()
        .map(|file| {
            let name = file
                .rsplit_once('.')
                .map_or(file.as_str(), |(stem, _)| stem)
                .to_ascii_lowercase();
            let has_thumbnail = thumbnails_dir
                .join(format!("{name}.png"))
                .metadata()
                .is_ok_and(|m| m.len() > 0);
            let dbc_id = by_name.get(&name).copied();

            IconManifestEntry {
                name,
                has_thumbnail,
                in_dbc: dbc_id.is_some(),
                dbc_id,
            }
        })
        .collect();

    let meta = IndexMeta::new(&[("SpellIcon.dbc", spell_icon_path)], now)?;
    Ok(IconManifest { meta, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::{DbcWriter, Record};
    use tempfile::tempdir;

    #[test]
    fn marks_icons_present_in_dbc_and_on_disk() {
        let dir = tempdir().unwrap();
        let thumbnails = dir.path().join("thumbnails");
        std::fs::create_dir_all(&thumbnails).unwrap();
        std::fs::write(thumbnails.join("spell_fire_flamebolt.png"), b"not-empty").unwrap();

        let schema = registry().get("SpellIcon").unwrap();
        let bytes = DbcWriter::new(schema)
            .write(&[Record::new(vec![
                Value::UInt32(135),
                Value::String("Interface\\Icons\\Spell_Fire_Flamebolt".to_string()),
            ])])
            .unwrap();
        let spell_icon_path = dir.path().join("SpellIcon.dbc");
        std::fs::write(&spell_icon_path, bytes).unwrap();

        let icon_list = IconList {
            generated: 1,
            count: 1,
            files: vec!["spell_fire_flamebolt.blp".to_string()],
        };

        let manifest = build(&icon_list, &thumbnails, &spell_icon_path, 1_000).unwrap();
        assert_eq!(manifest.entries.len(), 1);
        let entry = &manifest.entries[0];
        assert!(entry.has_thumbnail);
        assert!(entry.in_dbc);
        assert_eq!(entry.dbc_id, Some(135));
    }
}

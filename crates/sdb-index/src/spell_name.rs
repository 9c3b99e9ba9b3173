//! spell-name index: heuristic best-name-field selection (§4.3)

use crate::meta::IndexMeta;
use crate::spell_icon::SpellIconIndex;
use crate::Result;
use sdb_wdbc::{registry, DbcParser, FieldType, RecordSet, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const SAMPLE_LIMIT: usize = 4_000;
const BLOCKLIST: [&str; 3] = ["spell editor", "tooltip", "<mult>"];

/// One resolved spell name entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellNameEntry {
    /// Best-guess display name
    pub name: String,
    /// Normalized icon base name, if the spell-icon index covers it
    #[serde(rename = "iconName")]
    pub icon_name: Option<String>,
}

/// Persisted shape of `spell-name-index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellNameIndex {
    /// Build metadata
    pub meta: IndexMeta,
    /// `spellId → {name, iconName}`
    pub index: HashMap<String, SpellNameEntry>,
}

/// §4.3 `isLikelySpellName`: plausible length, has a letter, free of
/// template/markup noise and blocklisted substrings
pub fn is_likely_spell_name(value: &str) -> bool {
    let len = value.chars().count();
    if !(2..=80).contains(&len) {
        return false;
    }
    if !value.chars().any(char::is_alphabetic) {
        return false;
    }
    if value.contains(['$', '{', '}', '<', '>', '[', ']']) {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    !BLOCKLIST.iter().any(|bad| lower.contains(bad))
}

fn is_noisy(value: &str) -> bool {
    value.contains(['$', '{', '}', '<', '>', '[', ']']) || value.chars().count() > 90
}

/// Score one candidate field across up to [`SAMPLE_LIMIT`] sampled rows
fn score_field(record_set: &RecordSet, field_index: usize, field_name: &str) -> i64 {
    let mut likely = 0i64;
    let mut non_empty = 0i64;
    let mut noisy = 0i64;

    for record in record_set.records().iter().take(SAMPLE_LIMIT) {
        let Some(Value::String(value)) = record.get(field_index) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        non_empty += 1;
        if is_likely_spell_name(value) {
            likely += 1;
        }
        if is_noisy(value) {
            noisy += 1;
        }
    }

    let mut score = 3 * likely + non_empty - 2 * noisy;
    if field_name == "SpellName" {
        score += 25;
    } else if field_name.starts_with("SpellName_") {
        score += 15;
    }
    score
}

/// Rank every string-typed field in `record_set` by [`score_field`],
/// highest first
pub fn rank_name_fields(record_set: &RecordSet) -> Vec<usize> {
    let mut scored: Vec<(usize, i64)> = record_set
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| field.field_type == FieldType::String)
        .map(|(i, field)| (i, score_field(record_set, i, &field.name)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(i, _)| i).collect()
}

/// Resolve a display name for `record`, trying `ranked_fields` in order
/// and falling back to `Spell <id>`
pub fn resolve_name(record_set: &RecordSet, ranked_fields: &[usize], spell_id: u32) -> String {
    for &field_index in ranked_fields {
        if let Some(Value::String(value)) = record_set
            .records()
            .iter()
            .find_map(|r| r.get(field_index))
        {
            if is_likely_spell_name(value) {
                return value.clone();
            }
        }
    }
    format!("Spell {spell_id}")
}

/// Build the spell-name index from `Spell.dbc`, joined with an already
/// built spell-icon index for the `iconName` field
pub fn build(
    spell_path: &Path,
    icon_index: &SpellIconIndex,
    now: u64,
) -> Result<SpellNameIndex> {
    let schema = registry().get("Spell").expect("Spell schema is bundled");
    let bytes = std::fs::read(spell_path)?;
    let record_set = DbcParser::parse_bytes(&bytes)?.parse_records(Some(schema))?;

    let id_index = schema.fields.iter().position(|f| f.name == "ID").expect("ID field");
    let ranked = rank_name_fields(&record_set);

    let index = record_set
        .records()
        .iter()
        .filter_map(|record| {
            let spell_id = record.get(id_index)?.as_key()?;
            let name = ranked
                .iter()
                .find_map(|&field_index| match record.get(field_index) {
                    Some(Value::String(v)) if is_likely_spell_name(v) => Some(v.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| format!("Spell {spell_id}"));
            let icon_name = icon_index.index.get(&spell_id.to_string()).cloned();
            Some((spell_id.to_string(), SpellNameEntry { name, icon_name }))
        })
        .collect();

    let meta = IndexMeta::new(&[("Spell.dbc", spell_path)], now)?;
    Ok(SpellNameIndex { meta, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_template_markup() {
        assert!(!is_likely_spell_name("Deal $s1 damage"));
        assert!(!is_likely_spell_name("<mult>"));
    }

    #[test]
    fn rejects_blocklisted_substrings() {
        assert!(!is_likely_spell_name("Spell Editor Debug Tool"));
        assert!(!is_likely_spell_name("Tooltip text here"));
    }

    #[test]
    fn accepts_plain_name() {
        assert!(is_likely_spell_name("Fireball"));
        assert!(is_likely_spell_name("Frost Nova"));
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert!(!is_likely_spell_name("x"));
        assert!(!is_likely_spell_name(&"x".repeat(81)));
    }
}

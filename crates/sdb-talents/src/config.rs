//! `talent-config.json` parsing and normalization (§4.7 "JSON → Lua").

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawConfig {
    classes: BTreeMap<u32, RawClass>,
}

#[derive(Debug, Deserialize)]
struct RawClass {
    #[serde(rename = "className")]
    class_name: String,
    specs: Vec<RawSpec>,
    #[serde(rename = "classTree", default)]
    class_tree: Option<Json>,
}

#[derive(Debug, Deserialize)]
struct RawSpec {
    name: String,
    rows: u32,
    cols: u32,
    talents: Vec<RawTalent>,
    #[serde(rename = "heroTrees", default)]
    hero_trees: Vec<Json>,
}

#[derive(Debug, Deserialize)]
struct RawTalent {
    id: Option<u32>,
    name: String,
    row: u32,
    col: u32,
    #[serde(rename = "maxRank", default = "default_max_rank")]
    max_rank: u32,
    #[serde(rename = "spellRanks", default)]
    spell_ranks: Vec<u32>,
}

fn default_max_rank() -> u32 {
    1
}

/// A single talent after synthetic-ID assignment.
#[derive(Debug, Clone, Serialize)]
pub struct Talent {
    pub id: u32,
    pub name: String,
    pub row: u32,
    pub col: u32,
    pub max_rank: u32,
    pub spell_ranks: Vec<u32>,
}

/// One spec tab, keyed by its 1-based `tabIdx`.
#[derive(Debug, Clone, Serialize)]
pub struct Tab {
    pub tab_idx: u32,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub talents: Vec<Talent>,
    pub hero_trees: Vec<Json>,
}

/// One class's normalized talent trees.
#[derive(Debug, Clone, Serialize)]
pub struct ClassTrees {
    pub class_id: u32,
    pub class_name: String,
    pub class_tree: Option<Json>,
    pub tabs: Vec<Tab>,
}

/// The fully normalized config, classes sorted by ID.
#[derive(Debug, Clone, Serialize)]
pub struct TalentConfig {
    pub classes: Vec<ClassTrees>,
}

/// Base for synthetic talent IDs assigned when a talent has no `id`.
/// Kept well above any real 3.3.5a talent ID range.
const SYNTHETIC_ID_BASE: u32 = 9_000_000;

/// Load and normalize `talent-config.json` at `path`.
pub fn load(path: &Path) -> Result<TalentConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig = serde_json::from_str(&text).map_err(|source| Error::ParseConfig {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize(raw))
}

fn normalize(raw: RawConfig) -> TalentConfig {
    let mut classes: Vec<ClassTrees> = raw
        .classes
        .into_iter()
        .map(|(class_id, class)| {
            let tabs = class
                .specs
                .into_iter()
                .enumerate()
                .map(|(i, spec)| normalize_tab(class_id, i as u32 + 1, spec))
                .collect();
            ClassTrees {
                class_id,
                class_name: class.class_name,
                class_tree: class.class_tree,
                tabs,
            }
        })
        .collect();
    classes.sort_by_key(|c| c.class_id);
    TalentConfig { classes }
}

fn normalize_tab(class_id: u32, tab_idx: u32, spec: RawSpec) -> Tab {
    let mut talents: Vec<Talent> = spec
        .talents
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let id = raw.id.unwrap_or_else(|| {
                SYNTHETIC_ID_BASE + class_id * 10_000 + tab_idx * 100 + i as u32
            });
            Talent {
                id,
                name: raw.name,
                row: raw.row,
                col: raw.col,
                max_rank: raw.max_rank,
                spell_ranks: raw.spell_ranks,
            }
        })
        .collect();
    talents.sort_by_key(|t| (t.row, t.col, t.id));
    Tab {
        tab_idx,
        name: spec.name,
        rows: spec.rows,
        cols: spec.cols,
        talents,
        hero_trees: spec.hero_trees,
    }
}

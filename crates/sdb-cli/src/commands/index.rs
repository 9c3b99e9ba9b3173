//! Derived-index rebuild commands (§4.3, §6.4 `/api/update-manifest`)

use anyhow::{Context, Result};
use clap::Subcommand;
use sdb_index::{icon_list, icon_manifest, spell_icon, spell_name, sprite_atlas};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Subcommand)]
pub enum IndexCommands {
    /// Rebuild every derived index from the current DBC and icon sources
    Rebuild {
        #[arg(long)]
        dbc_dir: PathBuf,
        #[arg(long)]
        base_icons_dir: PathBuf,
        #[arg(long)]
        export_icons_dir: PathBuf,
        #[arg(long)]
        thumbnails_dir: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        /// Talent config used to group icons by class for the sprite atlas
        #[arg(long)]
        talent_config: Option<PathBuf>,
    },
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn write_json<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn execute(command: IndexCommands) -> Result<()> {
    match command {
        IndexCommands::Rebuild {
            dbc_dir,
            base_icons_dir,
            export_icons_dir,
            thumbnails_dir,
            out_dir,
            talent_config,
        } => rebuild(
            &dbc_dir,
            &base_icons_dir,
            &export_icons_dir,
            &thumbnails_dir,
            &out_dir,
            talent_config.as_deref(),
        ),
    }
}

fn rebuild(
    dbc_dir: &std::path::Path,
    base_icons_dir: &std::path::Path,
    export_icons_dir: &std::path::Path,
    thumbnails_dir: &std::path::Path,
    out_dir: &std::path::Path,
    talent_config: Option<&std::path::Path>,
) -> Result<()> {
    let now = now();
    let spell_path = dbc_dir.join("Spell.dbc");
    let spell_icon_path = dbc_dir.join("SpellIcon.dbc");

    let icon_list =
        icon_list::scan_layered(base_icons_dir, export_icons_dir).context("scanning icon directories")?;
    icon_list::persist(&out_dir.join("icon-list.json"), &icon_list)?;
    println!("icon-list.json: {} icons", icon_list.count);

    let icon_index = spell_icon::build(&spell_path, &spell_icon_path, now)?;
    write_json(&out_dir.join("spell-icon-index.json"), &icon_index)?;
    println!("spell-icon-index.json: {} spells", icon_index.index.len());

    let name_index = spell_name::build(&spell_path, &icon_index, now)?;
    write_json(&out_dir.join("spell-name-index.json"), &name_index)?;
    println!("spell-name-index.json: {} spells", name_index.index.len());

    let manifest = icon_manifest::build(&icon_list, thumbnails_dir, &spell_icon_path, now)?;
    write_json(&out_dir.join("icon-manifest.json"), &manifest)?;
    println!("icon-manifest.json: {} entries", manifest.entries.len());

    if let Some(talent_config) = talent_config {
        let config = sdb_talents::load(talent_config)?;
        let class_icons = class_icon_sets(&config, &icon_index);
        let sprite_map = sprite_atlas::build(&class_icons, thumbnails_dir, out_dir)?;
        write_json(&out_dir.join("sprite-map.json"), &sprite_map)?;
        println!("sprite-map.json: {} classes", sprite_map.classes.len());
    }

    Ok(())
}

/// Group the icon names reached by each class's talents, using the first
/// rank of each talent to resolve an icon via the spell-icon index.
fn class_icon_sets(
    config: &sdb_talents::TalentConfig,
    icon_index: &spell_icon::SpellIconIndex,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut by_class: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for class in &config.classes {
        let icons = by_class.entry(class.class_name.clone()).or_default();
        for tab in &class.tabs {
            for talent in &tab.talents {
                if let Some(&rank_id) = talent.spell_ranks.first() {
                    if let Some(icon_name) = icon_index.index.get(&rank_id.to_string()) {
                        icons.insert(icon_name.clone());
                    }
                }
            }
        }
    }
    by_class
}

//! Per-class talent-icon sprite atlas (§4.3)

use crate::Result;
use image::{GenericImage, ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// Tile size, in pixels, of every icon placed in an atlas
pub const ICON_SIZE: u32 = 64;
/// Maximum tiles placed per atlas row
pub const ICONS_PER_ROW: u32 = 16;

/// Pixel offset of one icon within its class atlas
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TilePosition {
    /// X offset in pixels
    pub x: u32,
    /// Y offset in pixels
    pub y: u32,
}

/// Persisted shape of `sprite-map.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteMap {
    /// Tile size in pixels (always [`ICON_SIZE`])
    #[serde(rename = "iconSize")]
    pub icon_size: u32,
    /// Tiles per row (always [`ICONS_PER_ROW`])
    #[serde(rename = "iconsPerRow")]
    pub icons_per_row: u32,
    /// `class → iconName → position`, icon names stored lowercased
    pub classes: HashMap<String, HashMap<String, TilePosition>>,
}

/// Build one atlas PNG per class and the shared sprite map, writing
/// `<out_dir>/<class>.png` for each class.
///
/// `class_icons` maps a class name to the set of icon base names its
/// talent spells reach; names are treated case-insensitively (lookup
/// falls back to a case-insensitive scan of `thumbnails_dir`).
pub fn build(
    class_icons: &BTreeMap<String, BTreeSet<String>>,
    thumbnails_dir: &Path,
    out_dir: &Path,
) -> Result<SpriteMap> {
    std::fs::create_dir_all(out_dir)?;
    let mut classes = HashMap::new();

    for (class, icons) in class_icons {
        let sorted: Vec<&String> = icons.iter().collect();
        let tile_count = sorted.len() as u32;
        let rows = tile_count.div_ceil(ICONS_PER_ROW).max(1);
        let cols = tile_count.min(ICONS_PER_ROW).max(1);

        let mut atlas: RgbaImage = ImageBuffer::from_pixel(
            cols * ICON_SIZE,
            rows * ICON_SIZE,
            Rgba([0, 0, 0, 0]),
        );

        let mut positions = HashMap::new();
        for (index, icon_name) in sorted.iter().enumerate() {
            let col = (index as u32) % ICONS_PER_ROW;
            let row = (index as u32) / ICONS_PER_ROW;
            let x = col * ICON_SIZE;
            let y = row * ICON_SIZE;

            if let Some(tile) = load_icon_tile(thumbnails_dir, icon_name) {
                let _ = atlas.copy_from(&tile, x, y);
            }

            positions.insert((*icon_name).clone(), TilePosition { x, y });
        }

        let atlas_path = out_dir.join(format!("{class}.png"));
        atlas
            .save(&atlas_path)
            .map_err(|e| crate::Error::Malformed(e.to_string()))?;

        classes.insert(class.clone(), positions);
    }

    Ok(SpriteMap {
        icon_size: ICON_SIZE,
        icons_per_row: ICONS_PER_ROW,
        classes,
    })
}

fn load_icon_tile(thumbnails_dir: &Path, icon_name: &str) -> Option<RgbaImage> {
    let direct = thumbnails_dir.join(format!("{icon_name}.png"));
    if let Ok(image) = image::open(&direct) {
        return Some(image.to_rgba8());
    }

    // Case-insensitive fallback scan.
    let entries = std::fs::read_dir(thumbnails_dir).ok()?;
    for entry in entries.filter_map(std::result::Result::ok) {
        let name = entry.file_name();
        let name = name.to_str()?;
        if let Some(stem) = name.strip_suffix(".png") {
            if stem.eq_ignore_ascii_case(icon_name) {
                return image::open(entry.path()).ok().map(|img| img.to_rgba8());
            }
        }
    }
    None
}

/// Case-insensitive lookup of an icon's tile position for `class`
pub fn lookup(map: &SpriteMap, class: &str, icon_name: &str) -> Option<TilePosition> {
    let by_class = map.classes.get(class)?;
    if let Some(position) = by_class.get(&icon_name.to_ascii_lowercase()) {
        return Some(*position);
    }
    by_class
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(icon_name))
        .map(|(_, position)| *position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn places_tiles_in_row_major_order() {
        let dir = tempdir().unwrap();
        let thumbnails = dir.path().join("thumbnails");
        std::fs::create_dir_all(&thumbnails).unwrap();

        let mut class_icons = BTreeMap::new();
        let mut icons = BTreeSet::new();
        icons.insert("a".to_string());
        icons.insert("b".to_string());
        class_icons.insert("mage".to_string(), icons);

        let out_dir = dir.path().join("sprites");
        let map = build(&class_icons, &thumbnails, &out_dir).unwrap();

        assert!(out_dir.join("mage.png").exists());
        let mage = &map.classes["mage"];
        assert_eq!(mage["a"].x, 0);
        assert_eq!(mage["b"].x, ICON_SIZE);
        assert_eq!(mage["a"].y, 0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut classes = HashMap::new();
        let mut positions = HashMap::new();
        positions.insert("spell_fire_flamebolt".to_string(), TilePosition { x: 0, y: 0 });
        classes.insert("mage".to_string(), positions);
        let map = SpriteMap {
            icon_size: ICON_SIZE,
            icons_per_row: ICONS_PER_ROW,
            classes,
        };

        assert!(lookup(&map, "mage", "Spell_Fire_Flamebolt").is_some());
    }
}

//! BLP → PNG rasterization (§4.4)

use crate::{Error, Result};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Square thumbnail edge length, in pixels
pub const THUMBNAIL_SIZE: u32 = 64;

/// Summary of one [`generate_all`] invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    /// Thumbnails newly written
    pub generated: u64,
    /// Thumbnails that already existed and were left alone
    pub skipped: u64,
    /// BLPs that failed to decode; logged individually, batch continues
    pub failed: u64,
}

/// Resolve the `.blp` source for icon `name`: the export (custom) directory
/// takes priority, but a missing or zero-byte export file falls back to the
/// base directory's copy of the same name (§3.4, §8).
pub fn resolve_source(name: &str, base_dir: &Path, export_dir: &Path) -> Option<PathBuf> {
    let export_path = export_dir.join(format!("{name}.blp"));
    if export_path.metadata().is_ok_and(|m| m.len() > 0) {
        return Some(export_path);
    }
    let base_path = base_dir.join(format!("{name}.blp"));
    if base_path.metadata().is_ok_and(|m| m.len() > 0) {
        return Some(base_path);
    }
    None
}

/// Ensure `thumbnails/<name>.png` exists for every `*.blp` visible in either
/// `base_dir` or `export_dir`, preferring the export copy of each name.
pub fn generate_all(base_dir: &Path, export_dir: &Path, thumbnails_dir: &Path) -> Result<BatchReport> {
    std::fs::create_dir_all(thumbnails_dir)?;
    let mut report = BatchReport::default();

    let mut names = std::collections::BTreeSet::new();
    for dir in [base_dir, export_dir] {
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.filter_map(std::result::Result::ok) {
                let path = entry.path();
                if is_blp(&path) {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.insert(stem.to_string());
                    }
                }
            }
        }
    }

    for name in names {
        match generate_one(&name, base_dir, export_dir, thumbnails_dir) {
            Ok(true) => report.generated += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                log::warn!("thumbnail generation failed for {name}: {e}");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Generate the thumbnail for icon `name`, returning `true` if it was
/// (re)written and `false` if an existing non-empty PNG was left alone.
/// Resolves the BLP source via [`resolve_source`], falling back from the
/// export directory to the base directory when needed.
pub fn generate_one(name: &str, base_dir: &Path, export_dir: &Path, thumbnails_dir: &Path) -> Result<bool> {
    let png_path = thumbnails_dir.join(format!("{name}.png"));

    if png_path.metadata().is_ok_and(|m| m.len() > 0) {
        return Ok(false);
    }

    let blp_path = resolve_source(name, base_dir, export_dir).ok_or_else(|| Error::Decode {
        path: name.to_string(),
        reason: "no base or export BLP found for this name".to_string(),
    })?;

    let thumbnail = decode_and_resize(&blp_path)?;
    write_atomically(&png_path, &thumbnail)?;
    Ok(true)
}

fn decode_and_resize(blp_path: &Path) -> Result<RgbaImage> {
    let blp = wow_blp::parser::load_blp(blp_path).map_err(|e| Error::Decode {
        path: blp_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let image = wow_blp::convert::blp_to_image(&blp, 0).map_err(|e| Error::Decode {
        path: blp_path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(contain_fit(image, THUMBNAIL_SIZE))
}

/// Resize `image` to fit within `size`×`size`, preserving aspect ratio,
/// and pad the remainder with a transparent background.
fn contain_fit(image: DynamicImage, size: u32) -> RgbaImage {
    let resized = image.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

    let x_offset = (size - resized.width()) / 2;
    let y_offset = (size - resized.height()) / 2;
    image::imageops::overlay(&mut canvas, &resized, i64::from(x_offset), i64::from(y_offset));
    canvas
}

fn write_atomically(png_path: &Path, image: &RgbaImage) -> Result<()> {
    let tmp_path = tmp_path_for(png_path);
    image
        .save(&tmp_path)
        .map_err(|e| Error::Decode {
            path: png_path.display().to_string(),
            reason: e.to_string(),
        })?;
    std::fs::rename(&tmp_path, png_path)?;
    Ok(())
}

fn tmp_path_for(png_path: &Path) -> PathBuf {
    png_path.with_extension("png.tmp")
}

fn is_blp(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("blp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba as RgbaPixel};
    use tempfile::tempdir;

    #[test]
    fn contain_fit_centers_a_smaller_image() {
        let small: DynamicImage =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(32, 16, RgbaPixel([255, 0, 0, 255])));
        let fitted = contain_fit(small, THUMBNAIL_SIZE);
        assert_eq!(fitted.width(), THUMBNAIL_SIZE);
        assert_eq!(fitted.height(), THUMBNAIL_SIZE);
        assert_eq!(*fitted.get_pixel(0, 0), RgbaPixel([0, 0, 0, 0]));
    }

    #[test]
    fn skips_existing_nonempty_thumbnail() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        let thumbnails = dir.path().join("thumbnails");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::create_dir_all(&thumbnails).unwrap();
        std::fs::write(thumbnails.join("icon.png"), b"already-here").unwrap();
        std::fs::write(export.join("icon.blp"), b"not-a-real-blp").unwrap();

        assert!(!generate_one("icon", &base, &export, &thumbnails).unwrap());
    }

    #[test]
    fn falls_back_to_base_when_export_copy_is_missing_or_empty() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();

        std::fs::write(base.join("icon.blp"), b"base-copy").unwrap();
        assert_eq!(
            resolve_source("icon", &base, &export),
            Some(base.join("icon.blp"))
        );

        // A zero-byte export copy is treated the same as a missing one.
        std::fs::write(export.join("icon.blp"), b"").unwrap();
        assert_eq!(
            resolve_source("icon", &base, &export),
            Some(base.join("icon.blp"))
        );

        std::fs::write(export.join("icon.blp"), b"export-copy").unwrap();
        assert_eq!(
            resolve_source("icon", &base, &export),
            Some(export.join("icon.blp"))
        );
    }
}

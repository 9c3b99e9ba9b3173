//! Daily snapshot of base and export DBC directories (§3.5, §4.5)

use crate::layers::Layers;
use chrono::Local;
use std::path::Path;

/// Snapshot every `.dbc` in `layers`' base and export directories into
/// `backups/<MM-DD-YYYY>/{base-dbc,export-dbc}/`, unless today's dated
/// directory already exists.
pub fn ensure_daily_backup(backups_root: &Path, layers: &Layers) -> std::io::Result<()> {
    let today_dir = backups_root.join(Local::now().format("%m-%d-%Y").to_string());
    if today_dir.exists() {
        return Ok(());
    }

    snapshot_dir(layers.base_dir(), &today_dir.join("base-dbc"))?;
    snapshot_dir(layers.export_dir(), &today_dir.join("export-dbc"))?;
    Ok(())
}

fn snapshot_dir(source: &Path, dest: &Path) -> std::io::Result<()> {
    if !source.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(source)?.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && is_dbc(&path) {
            std::fs::copy(&path, dest.join(entry.file_name()))?;
        }
    }
    Ok(())
}

fn is_dbc(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dbc"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn snapshots_both_layers_into_a_dated_directory() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        let backups = dir.path().join("backups");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::write(base.join("Spell.dbc"), b"base-bytes").unwrap();
        std::fs::write(export.join("Spell.dbc"), b"export-bytes").unwrap();

        let layers = Layers::new(&base, &export);
        ensure_daily_backup(&backups, &layers).unwrap();

        let today = Local::now().format("%m-%d-%Y").to_string();
        assert!(backups.join(&today).join("base-dbc").join("Spell.dbc").exists());
        assert!(backups.join(&today).join("export-dbc").join("Spell.dbc").exists());
    }

    #[test]
    fn does_not_rewrite_an_existing_dated_directory() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        let backups = dir.path().join("backups");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::write(base.join("Spell.dbc"), b"v1").unwrap();

        let layers = Layers::new(&base, &export);
        ensure_daily_backup(&backups, &layers).unwrap();

        std::fs::write(base.join("Spell.dbc"), b"v2").unwrap();
        ensure_daily_backup(&backups, &layers).unwrap();

        let today = Local::now().format("%m-%d-%Y").to_string();
        let snapshot = backups.join(&today).join("base-dbc").join("Spell.dbc");
        assert_eq!(std::fs::read(snapshot).unwrap(), b"v1");
    }
}

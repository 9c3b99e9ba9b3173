//! Icon list and icon-directory watcher (§4.3)

use crate::Result;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Coalescing delay before a burst of filesystem events is persisted
pub const DEBOUNCE: Duration = Duration::from_secs(1);

/// Persisted shape of `icon-list.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconList {
    /// Number of `.blp` files in the icon directory
    pub generated: u64,
    /// Same as `generated`, kept for the on-disk shape's `count` field
    pub count: usize,
    /// Sorted `.blp` file names
    pub files: Vec<String>,
}

fn is_blp(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("blp"))
}

/// List and sort (code-point order) every `.blp` in `icon_dir`
pub fn scan(icon_dir: &Path) -> std::io::Result<IconList> {
    let mut files: Vec<String> = std::fs::read_dir(icon_dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_blp(path))
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect();
    files.sort();

    Ok(IconList {
        generated: files.len() as u64,
        count: files.len(),
        files,
    })
}

/// Same as [`scan`], but unions the base and export icon directories the
/// way [`sdb_thumbnails`][thumbnails] resolves a BLP's source: a name
/// present in either layer is listed once. Neither directory needs to
/// exist.
///
/// [thumbnails]: https://docs.rs/sdb-thumbnails
pub fn scan_layered(base_dir: &Path, export_dir: &Path) -> std::io::Result<IconList> {
    let mut files = BTreeSet::new();
    for dir in [base_dir, export_dir] {
        if let Ok(entries) = std::fs::read_dir(dir) {
            files.extend(
                entries
                    .filter_map(std::result::Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| is_blp(path))
                    .filter_map(|path| path.file_name()?.to_str().map(str::to_string)),
            );
        }
    }
    let files: Vec<String> = files.into_iter().collect();

    Ok(IconList {
        generated: files.len() as u64,
        count: files.len(),
        files,
    })
}

/// Persist `list` to `path` atomically
pub fn persist(path: &Path, list: &IconList) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(list).map_err(|e| crate::Error::Malformed(e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// In-memory view of the icon directory, kept current by a non-recursive
/// filesystem watcher. Creation and deletion events update the in-memory
/// set immediately; persistence to `icon-list.json` is debounced so a
/// burst of events coalesces into a single write.
pub struct IconWatcher {
    _watcher: RecommendedWatcher,
    names: Arc<Mutex<BTreeSet<String>>>,
}

impl IconWatcher {
    /// Start watching `icon_dir` (non-recursively), persisting the
    /// debounced list to `index_path` on every settled burst of events
    pub fn spawn(icon_dir: PathBuf, index_path: PathBuf) -> notify::Result<Self> {
        let initial = scan(&icon_dir).unwrap_or(IconList {
            generated: 0,
            count: 0,
            files: Vec::new(),
        });
        let names = Arc::new(Mutex::new(initial.files.iter().cloned().collect()));

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&icon_dir, RecursiveMode::NonRecursive)?;

        let worker_names = Arc::clone(&names);
        std::thread::spawn(move || loop {
            let Ok(event) = rx.recv() else { break };
            apply_event(&worker_names, event);

            // Coalesce any further events that arrive within DEBOUNCE.
            loop {
                match rx.recv_timeout(DEBOUNCE) {
                    Ok(event) => apply_event(&worker_names, event),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }

            let files: Vec<String> = worker_names.lock().unwrap_or_else(|e| e.into_inner()).iter().cloned().collect();
            let list = IconList {
                generated: files.len() as u64,
                count: files.len(),
                files,
            };
            let _ = persist(&index_path, &list);
        });

        Ok(Self {
            _watcher: watcher,
            names,
        })
    }

    /// Snapshot of the current in-memory icon name set
    pub fn current(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(|e| e.into_inner()).iter().cloned().collect()
    }
}

fn apply_event(names: &Mutex<BTreeSet<String>>, event: notify::Result<notify::Event>) {
    let Ok(event) = event else { return };
    let mut names = names.lock().unwrap_or_else(|e| e.into_inner());

    for path in &event.paths {
        if !is_blp(path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match event.kind {
            notify::EventKind::Create(_) => {
                names.insert(name.to_string());
            }
            notify::EventKind::Remove(_) => {
                names.remove(name);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scans_and_sorts_blp_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("spell_fire_flamebolt.blp"), b"").unwrap();
        std::fs::write(dir.path().join("ability_mage_frostbolt02.blp"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let list = scan(dir.path()).unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(
            list.files,
            vec!["ability_mage_frostbolt02.blp", "spell_fire_flamebolt.blp"]
        );
    }

    #[test]
    fn scan_layered_unions_base_and_export_without_duplicating_shared_names() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::write(base.join("spell_fire_flamebolt.blp"), b"").unwrap();
        std::fs::write(base.join("ability_mage_frostbolt02.blp"), b"").unwrap();
        std::fs::write(export.join("ability_mage_frostbolt02.blp"), b"").unwrap();
        std::fs::write(export.join("spell_holy_heal02.blp"), b"").unwrap();

        let list = scan_layered(&base, &export).unwrap();
        assert_eq!(
            list.files,
            vec![
                "ability_mage_frostbolt02.blp",
                "spell_fire_flamebolt.blp",
                "spell_holy_heal02.blp",
            ]
        );
    }

    #[test]
    fn scan_layered_tolerates_a_missing_directory() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("icon.blp"), b"").unwrap();

        let list = scan_layered(&base, &dir.path().join("does-not-exist")).unwrap();
        assert_eq!(list.files, vec!["icon.blp"]);
    }

    #[test]
    fn persists_atomically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("icon-list.json");
        let list = IconList {
            generated: 1,
            count: 1,
            files: vec!["a.blp".to_string()],
        };
        persist(&path, &list).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}

//! Watcher-driven single-file thumbnail regeneration (§4.4)

use crate::engine;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Settle delay before regenerating a thumbnail after a BLP creation event
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the export icon directory and regenerates the thumbnail for any
/// `*.blp` created or modified there, 500 ms after the write settles,
/// falling back to the base directory the same way [`engine::generate_one`]
/// does when the triggering export copy turns out missing or zero-byte.
pub struct ThumbnailWatcher {
    _watcher: RecommendedWatcher,
}

impl ThumbnailWatcher {
    /// Spawn a background watcher over `export_dir`, writing thumbnails
    /// into `thumbnails_dir` as new or changed BLPs settle, resolving each
    /// name against `base_dir`/`export_dir` via [`engine::resolve_source`].
    pub fn spawn(base_dir: &Path, export_dir: &Path, thumbnails_dir: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(export_dir, RecursiveMode::NonRecursive)?;

        let base_dir = base_dir.to_path_buf();
        let export_dir = export_dir.to_path_buf();
        let thumbnails_dir = thumbnails_dir.to_path_buf();
        std::thread::spawn(move || {
            let mut pending: Option<String> = None;
            loop {
                match rx.recv_timeout(DEBOUNCE) {
                    Ok(Ok(event)) => {
                        if let Some(name) = relevant_blp_name(&event) {
                            pending = Some(name);
                        }
                    }
                    Ok(Err(_)) => {}
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(name) = pending.take() {
                            if let Err(e) = engine::generate_one(
                                &name,
                                &base_dir,
                                &export_dir,
                                &thumbnails_dir,
                            ) {
                                log::warn!("thumbnail regeneration failed for {name}: {e}");
                            }
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

fn relevant_blp_name(event: &Event) -> Option<String> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return None;
    }
    event
        .paths
        .iter()
        .find(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("blp"))
        })
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventAttributes};

    #[test]
    fn ignores_non_blp_events() {
        let event = Event {
            kind: EventKind::Create(CreateKind::File),
            paths: vec![PathBuf::from("/tmp/icon.png")],
            attrs: EventAttributes::default(),
        };
        assert!(relevant_blp_name(&event).is_none());
    }

    #[test]
    fn picks_up_blp_creation() {
        let event = Event {
            kind: EventKind::Create(CreateKind::File),
            paths: vec![PathBuf::from("/tmp/icon.blp")],
            attrs: EventAttributes::default(),
        };
        assert_eq!(relevant_blp_name(&event), Some("icon".to_string()));
    }
}

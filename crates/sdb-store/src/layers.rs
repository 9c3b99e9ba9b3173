//! Base/export directory layering (§3.4)

use std::path::{Path, PathBuf};

/// Which side of the layering a read should prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// `export/…/F` if it exists, else `base/…/F`
    #[default]
    Auto,
    /// Force reading from `base/…/F`
    Base,
    /// Force reading from `export/…/F`
    Export,
}

/// Resolves file names against a read-only base directory and a
/// write-only export directory, per §3.4
#[derive(Debug, Clone)]
pub struct Layers {
    base: PathBuf,
    export: PathBuf,
}

impl Layers {
    /// Point the layering at `base` and `export` directories
    pub fn new(base: impl Into<PathBuf>, export: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            export: export.into(),
        }
    }

    /// Path a file named `name` would have under base
    pub fn base_path(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    /// Path a file named `name` would have under export
    pub fn export_path(&self, name: &str) -> PathBuf {
        self.export.join(name)
    }

    /// The base directory root
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// The export directory root
    pub fn export_dir(&self) -> &Path {
        &self.export
    }

    /// Resolve the effective path to read `name` from, per `source`
    ///
    /// `Auto` prefers export when it exists, falling back to base.
    pub fn resolve(&self, name: &str, source: Source) -> Option<PathBuf> {
        match source {
            Source::Base => self.base_path(name).exists().then(|| self.base_path(name)),
            Source::Export => self
                .export_path(name)
                .exists()
                .then(|| self.export_path(name)),
            Source::Auto => {
                let export_path = self.export_path(name);
                if export_path.exists() {
                    Some(export_path)
                } else {
                    let base_path = self.base_path(name);
                    base_path.exists().then_some(base_path)
                }
            }
        }
    }

    /// Whether `name` exists under base
    pub fn has_base(&self, name: &str) -> bool {
        self.base_path(name).exists()
    }

    /// Whether `name` exists under export
    pub fn has_export(&self, name: &str) -> bool {
        self.export_path(name).exists()
    }

    /// Every `.dbc` file name visible through either layer
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.base)
            .into_iter()
            .flatten()
            .chain(std::fs::read_dir(&self.export).into_iter().flatten())
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.to_ascii_lowercase().ends_with(".dbc"))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn export_takes_priority_over_base_in_auto_mode() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::write(base.join("Spell.dbc"), b"base").unwrap();
        std::fs::write(export.join("Spell.dbc"), b"export").unwrap();

        let layers = Layers::new(&base, &export);
        let resolved = layers.resolve("Spell.dbc", Source::Auto).unwrap();
        assert_eq!(std::fs::read(resolved).unwrap(), b"export");
    }

    #[test]
    fn falls_back_to_base_when_no_export_copy_exists() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        let export = dir.path().join("export");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::create_dir_all(&export).unwrap();
        std::fs::write(base.join("Spell.dbc"), b"base").unwrap();

        let layers = Layers::new(&base, &export);
        let resolved = layers.resolve("Spell.dbc", Source::Auto).unwrap();
        assert_eq!(std::fs::read(resolved).unwrap(), b"base");
    }

    #[test]
    fn missing_file_resolves_to_none() {
        let dir = tempdir().unwrap();
        let layers = Layers::new(dir.path().join("base"), dir.path().join("export"));
        assert!(layers.resolve("Nope.dbc", Source::Auto).is_none());
    }
}

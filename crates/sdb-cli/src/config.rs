//! Loads `config.json` and `starter-config.json` (§6.3)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbcPaths {
    pub dbc: PathBuf,
    pub icons: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paths {
    pub base: DbcPaths,
    pub custom: DbcPaths,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(rename = "activeDBCSource", default)]
    pub active_dbc_source: String,
    #[serde(rename = "activeIconSource", default)]
    pub active_icon_source: String,
    #[serde(rename = "allowBaseModification", default)]
    pub allow_base_modification: bool,
    #[serde(default)]
    pub initialized: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_dbc_source: "base".to_string(),
            active_icon_source: "base".to_string(),
            allow_base_modification: false,
            initialized: false,
        }
    }
}

/// `config.json`: repository-local paths plus operator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub settings: Settings,
}

/// Fatal at startup: a malformed or unreadable config aborts the process
/// with a non-zero exit code (§6.5).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("parsing {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StarterPaths {
    #[serde(rename = "acoreRoot")]
    pub acore_root: PathBuf,
    #[serde(rename = "authBin")]
    pub auth_bin: PathBuf,
    #[serde(rename = "worldBin")]
    pub world_bin: PathBuf,
    #[serde(rename = "armoryBin")]
    pub armory_bin: PathBuf,
    #[serde(rename = "logsDir")]
    pub logs_dir: PathBuf,
    #[serde(rename = "processPatterns", default)]
    pub process_patterns: Option<ProcessPatterns>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessPatterns {
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub world: Option<String>,
    #[serde(default)]
    pub armory: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Security {
    #[serde(rename = "adminMinLevel")]
    pub admin_min_level: u8,
}

/// `starter-config.json`: database connection and the supervisor's view of
/// the three managed services.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StarterConfig {
    pub db: DbConfig,
    pub paths: StarterPaths,
    pub security: Security,
}

pub fn load_starter_config(path: &Path) -> Result<StarterConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl StarterConfig {
    /// Build the three managed [`sdb_auth::ServiceConfig`]s from this config,
    /// falling back to the service name as the match pattern.
    pub fn service_configs(&self) -> Vec<sdb_auth::ServiceConfig> {
        let patterns = self.paths.process_patterns.clone().unwrap_or(ProcessPatterns {
            auth: None,
            world: None,
            armory: None,
        });
        vec![
            named_service("auth", &self.paths.auth_bin, patterns.auth, &self.paths.logs_dir),
            named_service("world", &self.paths.world_bin, patterns.world, &self.paths.logs_dir),
            named_service("armory", &self.paths.armory_bin, patterns.armory, &self.paths.logs_dir),
        ]
    }
}

fn named_service(
    name: &str,
    binary_path: &Path,
    pattern: Option<String>,
    log_dir: &Path,
) -> sdb_auth::ServiceConfig {
    let mut config = sdb_auth::ServiceConfig::new(name, binary_path, log_dir);
    if let Some(pattern) = pattern {
        config.match_pattern = pattern;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"paths":{"base":{"dbc":"dbc","icons":"Icons"},"custom":{"dbc":"custom-dbc","icons":"custom-icon"}},
                "settings":{"activeDBCSource":"base","activeIconSource":"base","allowBaseModification":false,"initialized":false}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.paths.base.dbc, PathBuf::from("dbc"));
        assert!(!config.settings.allow_base_modification);
    }

    #[test]
    fn missing_config_is_a_read_error() {
        let result = load_config(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

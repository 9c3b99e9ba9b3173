//! Renders a normalized [`TalentConfig`](crate::config::TalentConfig) into the
//! `SURREAL_TALENT_TREES` Lua global and deploys it to two locations (§4.7).

use crate::config::TalentConfig;
use crate::repack::DisplayCoord;
use crate::{Error, Result};
use serde_json::Value as Json;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Where a deployment wrote its Lua file, plus the rendered byte length.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub source_path: PathBuf,
    pub runtime_path: PathBuf,
    pub bytes_written: usize,
}

/// Render `config` as a Lua chunk defining `SURREAL_TALENT_TREES`.
pub fn render(config: &TalentConfig) -> String {
    let mut out = String::new();
    out.push_str("-- generated by sdb-talents; do not edit by hand\n");
    out.push_str("SURREAL_TALENT_TREES = {\n");
    for class in &config.classes {
        let _ = writeln!(out, "  [{}] = {{", class.class_id);
        let _ = writeln!(out, "    className = {},", lua_string(&class.class_name));
        out.push_str("    tabs = {\n");
        for tab in &class.tabs {
            let _ = writeln!(out, "      [{}] = {{", tab.tab_idx);
            let _ = writeln!(out, "        name = {},", lua_string(&tab.name));
            let _ = writeln!(out, "        rows = {}, cols = {},", tab.rows, tab.cols);
            out.push_str("        talents = {\n");
            for talent in &tab.talents {
                out.push_str("          {\n");
                let _ = writeln!(out, "            id = {},", talent.id);
                let _ = writeln!(out, "            name = {},", lua_string(&talent.name));
                let _ = writeln!(out, "            row = {}, col = {},", talent.row, talent.col);
                let _ = writeln!(out, "            maxRank = {},", talent.max_rank);
                let ranks = talent
                    .spell_ranks
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "            spellRanks = {{ {ranks} }},");
                out.push_str("          },\n");
            }
            out.push_str("        },\n");
            if !tab.hero_trees.is_empty() {
                let _ = writeln!(out, "        heroTrees = {},", json_to_lua(&Json::Array(tab.hero_trees.clone())));
            }
            out.push_str("      },\n");
        }
        out.push_str("    },\n");
        if let Some(class_tree) = &class.class_tree {
            let _ = writeln!(out, "    classTree = {},", json_to_lua(class_tree));
        }
        out.push_str("  },\n");
    }
    out.push_str("}\n");
    out
}

/// Render a set of legacy-repack display coordinates as a parallel Lua table
/// mapping `(classToken, tabNumber, talentIndex) -> (displayRow, displayCol)`.
pub fn render_coords(coords: &[DisplayCoord]) -> String {
    let mut out = String::new();
    out.push_str("-- generated by sdb-talents; do not edit by hand\n");
    out.push_str("SURREAL_TALENT_DISPLAY_COORDS = {\n");
    for coord in coords {
        let _ = writeln!(
            out,
            "  [{}] = {{ [{}] = {{ [{}] = {{ row = {}, col = {} }} }} }},",
            coord.class_token, coord.tab_number, coord.talent_index, coord.display_row, coord.display_col
        );
    }
    out.push_str("}\n");
    out
}

/// Convert an arbitrary JSON value (used for the config's opaque
/// `classTree`/`heroTrees` payloads) into an equivalent Lua table literal.
fn json_to_lua(value: &Json) -> String {
    match value {
        Json::Null => "nil".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => lua_string(s),
        Json::Array(items) => {
            let body = items.iter().map(json_to_lua).collect::<Vec<_>>().join(", ");
            format!("{{ {body} }}")
        }
        Json::Object(map) => {
            let body = map
                .iter()
                .map(|(k, v)| format!("[{}] = {}", lua_string(k), json_to_lua(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {body} }}")
        }
    }
}

fn lua_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('"');
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

/// Render `config` and write it atomically to both `source_dir` and
/// `runtime_dir` under the same file name. Never touches any `.dbc` file.
pub fn deploy(config: &TalentConfig, source_dir: &Path, runtime_dir: &Path) -> Result<DeployReport> {
    const FILE_NAME: &str = "SurrealTalentConfig_AIO.lua";
    let rendered = render(config);

    let source_path = source_dir.join(FILE_NAME);
    let runtime_path = runtime_dir.join(FILE_NAME);
    write_atomically(&source_path, &rendered)?;
    write_atomically(&runtime_path, &rendered)?;

    Ok(DeployReport {
        source_path,
        runtime_path,
        bytes_written: rendered.len(),
    })
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::WriteLua {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let tmp = path.with_extension("lua.tmp");
    std::fs::write(&tmp, contents).map_err(|source| Error::WriteLua {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| Error::WriteLua {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassTrees, Tab, Talent, TalentConfig};

    fn sample_config() -> TalentConfig {
        TalentConfig {
            classes: vec![ClassTrees {
                class_id: 1,
                class_name: "Warrior".to_string(),
                class_tree: None,
                tabs: vec![Tab {
                    tab_idx: 1,
                    name: "Arms".to_string(),
                    rows: 8,
                    cols: 4,
                    hero_trees: vec![],
                    talents: vec![Talent {
                        id: 100,
                        name: "Deflection".to_string(),
                        row: 0,
                        col: 0,
                        max_rank: 5,
                        spell_ranks: vec![1, 2, 3, 4, 5],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn render_is_deterministic_across_calls() {
        let config = sample_config();
        assert_eq!(render(&config), render(&config));
    }

    #[test]
    fn deploy_writes_identical_bytes_to_both_locations() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let runtime = dir.path().join("runtime");
        let config = sample_config();

        let report = deploy(&config, &source, &runtime).unwrap();
        let a = std::fs::read_to_string(&report.source_path).unwrap();
        let b = std::fs::read_to_string(&report.runtime_path).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("SURREAL_TALENT_TREES"));
    }

    #[test]
    fn second_deploy_is_byte_equal_to_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let runtime = dir.path().join("runtime");
        let config = sample_config();

        let first = deploy(&config, &source, &runtime).unwrap();
        let before = std::fs::read(&first.source_path).unwrap();
        let second = deploy(&config, &source, &runtime).unwrap();
        let after = std::fs::read(&second.source_path).unwrap();
        assert_eq!(before, after);
    }
}

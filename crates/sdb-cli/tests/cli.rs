//! CLI integration tests for the `sdb` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sdb() -> Command {
    Command::cargo_bin("sdb").expect("sdb binary built by cargo")
}

#[test]
fn help_lists_every_domain_subcommand() {
    sdb()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbc"))
        .stdout(predicate::str::contains("spells"))
        .stdout(predicate::str::contains("talents"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn completions_generates_a_nonempty_script() {
    sdb()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sdb"));
}

#[test]
fn dbc_info_on_missing_file_fails_with_a_message() {
    sdb()
        .args(["dbc", "info", "/nonexistent/Spell.dbc"])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn talents_repack_status_always_reports_unavailable() {
    sdb()
        .args(["talents", "repack-status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repack unavailable"));
}

#[test]
fn talents_deploy_writes_lua_to_both_directories() {
    let temp = TempDir::new().expect("temp dir");
    let config_path = temp.path().join("talent-config.json");
    let source_dir = temp.path().join("source");
    let runtime_dir = temp.path().join("runtime");
    fs::create_dir_all(&source_dir).unwrap();
    fs::create_dir_all(&runtime_dir).unwrap();

    fs::write(
        &config_path,
        r#"{
            "classes": {
                "1": {
                    "className": "Warrior",
                    "specs": [
                        {
                            "name": "Arms",
                            "rows": 8,
                            "cols": 4,
                            "talents": [
                                {
                                    "id": 100,
                                    "name": "Deflection",
                                    "row": 0,
                                    "col": 0,
                                    "maxRank": 5,
                                    "spellRanks": [100, 101]
                                }
                            ]
                        }
                    ]
                }
            }
        }"#,
    )
    .unwrap();

    sdb()
        .args(["talents", "deploy"])
        .arg(&config_path)
        .arg("--source-dir")
        .arg(&source_dir)
        .arg("--runtime-dir")
        .arg(&runtime_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("deployed"));

    let deployed = fs::read_dir(&source_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .count();
    assert!(deployed > 0, "deploy should have written a Lua file to source_dir");
}

#[test]
fn dbc_list_requires_a_config_file() {
    let temp = TempDir::new().expect("temp dir");
    sdb()
        .current_dir(temp.path())
        .args(["dbc", "list"])
        .assert()
        .failure();
}

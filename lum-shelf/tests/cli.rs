//! Integration tests for the lum-shelf CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_string_lossy().replace('\\', "\\\\");

        let config_content = format!(
            r#"
[database]
path = "{dir}/lumina.db"

[storage]
state_file = "{dir}/state.toml"
blob_dir = "{dir}/blobs"
"#
        );
        fs::write(temp_dir.path().join("config.toml"), config_content).unwrap();

        Self { temp_dir }
    }

    fn cmd(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.env("LUMINA_CONFIG", self.temp_dir.path().join("config.toml"))
            .env_remove("LUMINA_CATALOG_API_KEY");
        cmd
    }
}

#[test]
fn test_shelf_requires_login() {
    let env = TestEnv::new();
    env.cmd("lum-shelf")
        .args(["add", "dom-casmurro"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lum-account login"));

    env.cmd("lum-shelf").arg("list").assert().code(2);
}

#[test]
fn test_invalid_status_rejected_by_parser() {
    let env = TestEnv::new();
    env.cmd("lum-shelf")
        .args(["status", "dom-casmurro", "finished"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status"));
}

#[test]
fn test_non_numeric_page_is_invalid_input() {
    let env = TestEnv::new();
    env.cmd("lum-shelf")
        .args(["progress", "dom-casmurro", "twelve"])
        .assert()
        .code(3);
}

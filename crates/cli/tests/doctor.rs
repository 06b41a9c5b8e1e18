use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn doctor_reads_provided_config_path() {
    let tmp = tempdir().unwrap();
    let types_dir = tmp.path().join("schemas");
    write_file(&types_dir.join("point.toml"), "[fields.x]\ntype = \"int\"\n");

    let cfg = tmp.path().join("config.toml");
    write_file(
        &cfg,
        r#"
version = 1
profile = "default"

[profiles.default]
types_dir = "{{config_dir}}/schemas"
"#,
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   rk doctor"))
        .stdout(predicate::str::contains("profile: default"))
        .stdout(predicate::str::contains(format!("types_dir: {}", types_dir.display())))
        .stdout(predicate::str::contains("record types: 1"));
}

#[test]
fn doctor_uses_xdg_default_when_present() {
    let tmp = tempdir().unwrap();
    write_file(
        &tmp.path().join("recordkit/config.toml"),
        r#"
version = 1
[profiles.default]
types_dir = "/tmp/rk-does-not-exist"
"#,
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   rk doctor"))
        .stdout(predicate::str::contains("record types: 0"));
}

#[test]
fn doctor_fails_when_config_missing() {
    let tmp = tempdir().unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL rk doctor"))
        .stdout(predicate::str::contains("looked for:"));
}

#[test]
fn doctor_falls_back_to_types_dir_flag() {
    let tmp = tempdir().unwrap();
    let types_dir = tmp.path().join("types");
    fs::create_dir_all(&types_dir).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.args(["doctor", "--types-dir", types_dir.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   rk doctor"))
        .stdout(predicate::str::contains("profile: default"));
}

#[test]
fn doctor_reports_broken_declarations() {
    let tmp = tempdir().unwrap();
    let types_dir = tmp.path().join("types");
    write_file(&types_dir.join("child.toml"), "extends = [\"ghost\"]\n");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.args(["doctor", "--types-dir", types_dir.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAIL rk doctor"))
        .stdout(predicate::str::contains("extends unknown type 'ghost'"));
}

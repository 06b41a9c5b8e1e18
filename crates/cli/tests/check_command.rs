use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

const PERSON: &str = r#"
description = "A person"

[fields.name]
type = "str"

[fields.age]
type = ["int", "float"]
default = 8
converter = "int"

[fields.salary]
type = ["int", "float"]
default = 0.0
"#;

/// A types directory holding `person.toml`, with XDG pointed at an empty dir.
fn setup() -> (TempDir, std::path::PathBuf) {
    let tmp = tempdir().unwrap();
    let types_dir = tmp.path().join("types");
    fs::create_dir_all(&types_dir).unwrap();
    fs::write(types_dir.join("person.toml"), PERSON).unwrap();
    (tmp, types_dir)
}

fn rk(tmp: &Path, types_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rk"));
    cmd.env("XDG_CONFIG_HOME", tmp);
    cmd.env_remove("RK_LOG");
    cmd.args(["--types-dir", types_dir.to_str().unwrap()]);
    cmd
}

#[test]
fn check_prints_normalized_record() {
    let (tmp, types_dir) = setup();
    let input = tmp.path().join("bob.yaml");
    fs::write(&input, "name: Bob\nage: 21.9\n").unwrap();

    let output = rk(tmp.path(), &types_dir)
        .args(["check", "person", input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        @"{'name': 'Bob', 'age': 21, 'salary': 0.0}"
    );
}

#[test]
fn check_json_input_and_output() {
    let (tmp, types_dir) = setup();
    let input = tmp.path().join("ann.json");
    fs::write(&input, r#"{"name": "Ann", "extra": true}"#).unwrap();

    rk(tmp.path(), &types_dir)
        .args(["check", "person", input.to_str().unwrap(), "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""extra": true"#))
        .stdout(predicate::str::contains(r#""age": 8"#))
        .stdout(predicate::str::contains(r#""salary": 0.0"#));
}

#[test]
fn check_reads_stdin() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["check", "person", "-", "--output", "yaml"])
        .write_stdin("name: Cy\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: Cy"))
        .stdout(predicate::str::contains("age: 8"));
}

#[test]
fn check_fails_on_first_error() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["check", "person", "-"])
        .write_stdin("age: old\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL person"))
        .stdout(predicate::str::contains("missing required field 'name', which is a str object"))
        .stdout(predicate::str::contains("'age'").not());
}

#[test]
fn check_all_reports_every_error() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["check", "person", "-", "--all"])
        .write_stdin("age: old\nsalary: [1]\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL person (3 errors)"))
        .stdout(predicate::str::contains("'name'"))
        .stdout(predicate::str::contains("'age'"))
        .stdout(predicate::str::contains("'salary'"));
}

#[test]
fn check_rejects_non_mapping_input() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["check", "person", "-"])
        .write_stdin("- a\n- b\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input must be a mapping"));
}

#[test]
fn check_unknown_type() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["check", "robot", "-"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("record type not found: robot"));
}

#[test]
fn types_lists_declarations() {
    let (tmp, types_dir) = setup();
    fs::write(types_dir.join("empty.toml"), "").unwrap();
    rk(tmp.path(), &types_dir)
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("empty\n"))
        .stdout(predicate::str::contains("person - A person"))
        .stdout(predicate::str::contains("-- 2 record types --"));
}

#[test]
fn describe_shows_field_table() {
    let (tmp, types_dir) = setup();
    rk(tmp.path(), &types_dir)
        .args(["describe", "person"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Field"))
        .stdout(predicate::str::contains("int or float"))
        .stdout(predicate::str::contains("required"))
        .stdout(predicate::str::contains("0.0"));
}

#[test]
fn rk_log_sends_diagnostics_to_stderr() {
    let (tmp, types_dir) = setup();
    let input = tmp.path().join("bob.yaml");
    fs::write(&input, "name: Bob\n").unwrap();

    rk(tmp.path(), &types_dir)
        .env("RK_LOG", "debug")
        .args(["check", "person", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("{'name': 'Bob', 'age': 8, 'salary': 0.0}"))
        .stderr(predicate::str::contains("checking input"));
}

#[test]
fn oversized_bytes_conversion_fails_cleanly() {
    let (tmp, types_dir) = setup();
    fs::write(
        types_dir.join("blob.toml"),
        "[fields.payload]\ntype = \"int\"\nconverter = \"bytes\"\n",
    )
    .unwrap();
    let input = tmp.path().join("blob.yaml");
    fs::write(&input, "payload: 9223372036854775807\n").unwrap();

    rk(tmp.path(), &types_dir)
        .args(["check", "blob", input.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("FAIL blob"))
        .stdout(predicate::str::contains("cannot allocate"));
}

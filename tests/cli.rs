use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const SCHEMA: &str = r#"{
  "NumberLiteral": {
    "unionType": ["Expression"],
    "fields": {
      "value": { "type": "number" },
      "raw": { "type": "string", "optional": true }
    }
  },
  "StringLiteral": {
    "unionType": ["Expression"],
    "fields": { "value": { "type": "string" } }
  },
  "Func": {
    "unionType": ["Statement"],
    "fields": {
      "params": { "type": "node", "array": true, "optional": true },
      "isExported": { "type": "boolean", "optional": true }
    }
  }
}"#;

fn write(path: &PathBuf, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn nodegen() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nodegen"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn rust_writes_module_to_file() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);
    let out = tmp.path().join("generated").join("nodes.rs");

    nodegen()
        .args(["rust", "-i", arg(&schema), "-o", arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let src = fs::read_to_string(&out).unwrap();
    assert!(src.starts_with("// THIS FILE IS AUTOGENERATED"));
    assert!(src.contains("pub fn number_literal("));
    assert!(src.contains("pub fn is_expression(node: &Node) -> bool"));
    assert!(src.contains("pub fn assert_func(node: &Node) -> Result<&Func, TypeMismatch>"));
}

#[test]
fn rust_to_stdout_with_builder_prefix() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);

    nodegen()
        .args(["rust", "-i", arg(&schema), "--builder-prefix", "build_"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pub fn build_number_literal("))
        .stdout(predicate::str::contains("pub fn is_number_literal(node: &Node) -> bool"));
}

#[test]
fn output_is_identical_across_runs() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);

    let run = || nodegen().args(["rust", "-i", arg(&schema)]).output().unwrap().stdout;
    assert_eq!(run(), run());
}

#[test]
fn reflect_prints_group_map() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);

    let assert = nodegen().args(["reflect", "-i", arg(&schema)]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let map: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        map,
        json!({ "Expression": ["NumberLiteral", "StringLiteral"], "Statement": ["Func"] })
    );
}

#[test]
fn json_pointer_selects_definitions() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("package.json");
    write(&schema, &format!(r#"{{ "name": "ast", "definitions": {SCHEMA} }}"#));

    nodegen()
        .args(["reflect", "-i", arg(&schema), "--json-pointer", "/definitions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Statement\""));
}

#[test]
fn build_prints_node() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);

    let assert = nodegen()
        .args(["build", "-i", arg(&schema), "--type", "Func", "--args", r#"{"params": [], "isExported": false}"#])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let node: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(node, json!({ "type": "Func" }));
}

#[test]
fn build_reports_argument_mismatch() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, SCHEMA);

    nodegen()
        .args(["build", "-i", arg(&schema), "--type", "NumberLiteral", "--args", r#"{"value": "5"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument NumberLiteral.value: expected number, got string"));
}

#[test]
fn invalid_schema_writes_nothing() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(
        &schema,
        r#"{ "Func": { "fields": { "kind": { "type": "string", "constant": true, "value": "func", "optional": true } } } }"#,
    );
    let out = tmp.path().join("nodes.rs");

    nodegen()
        .args(["rust", "-i", arg(&schema), "-o", arg(&out)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid schema: Func.kind cannot be both constant and optional"));
    assert!(!out.exists());
}

#[test]
fn duplicate_types_across_documents() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("defs").join("a.json"), SCHEMA);
    write(
        &tmp.path().join("defs").join("b.json"),
        r#"{ "Func": { "fields": {} } }"#,
    );
    let pattern = format!("{}/defs/*.json", tmp.path().display());

    nodegen()
        .args(["rust", "-i", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("type Func is defined more than once"));
}

#[test]
fn parse_errors_name_the_json_path() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, r#"{ "Func": { "fields": { "body": { "type": "nodes" } } } }"#);

    nodegen()
        .args(["rust", "-i", arg(&schema)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Func.fields.body.type"));
}

#[test]
fn build_rejects_invalid_schema() {
    let tmp = tempdir().unwrap();
    let schema = tmp.path().join("defs.json");
    write(&schema, r#"{ "Func": { "fields": { "kind": { "type": "string", "constant": true } } } }"#);

    nodegen()
        .args(["build", "-i", arg(&schema), "--type", "Func"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid schema: Func.kind is constant but has no value"));
}

//! Integration tests for the tagsheet CLI

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn run_command(dir: &Path, args: &[&str]) -> (String, String, i32) {
    // Tests must not depend on a user's ~/.config/tagsheet/config.toml.
    let config = dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "formula_timeout_ms = 200\n").expect("write config");
    }

    let output = Command::new(env!("CARGO_BIN_EXE_tagsheet"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path.to_string_lossy().to_string()
}

const SHEET: &str = r#"{
  "id": "s1",
  "name": "Scores",
  "created": "2024-01-01T00:00:00Z",
  "updated": "2024-01-01T00:00:00Z",
  "columns": [
    {"id": "c1", "title": "Score", "type": "number"},
    {"id": "f1", "title": "Next", "type": "formula", "formula": "Score + 1", "formulaType": "expression"},
    {"id": "f2", "title": "Spin", "type": "formula", "formula": "let n = 0;\nloop { n += 1; }"}
  ],
  "rows": [
    {"id": "r1", "values": {"c1": "7"}},
    {"id": "r2", "values": {"c1": "1"}}
  ],
  "tagCache": {}
}"#;

#[test]
fn test_new_prints_sheet_with_default_column() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_command(dir.path(), &["new", "Inbox"]);
    assert_eq!(code, 0);
    let sheet: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sheet["name"], "Inbox");
    assert_eq!(sheet["columns"][0]["title"], "Untitled column");
    assert_eq!(sheet["columns"][0]["type"], "text");
}

#[test]
fn test_replay_applies_actions() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "sheet.json", SHEET);
    let actions = write(
        dir.path(),
        "actions.json",
        r#"[
          {"action": "add_row", "params": {"rowId": "r3"}},
          {"action": "update_cell", "params": {"rowId": "r3", "columnId": "c1", "value": "41"}}
        ]"#,
    );
    let (stdout, stderr, code) = run_command(dir.path(), &["replay", &sheet, &actions]);
    assert_eq!(code, 0, "{stderr}");
    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["rows"][2]["values"]["c1"], "41");
}

#[test]
fn test_replay_writes_out_file() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "sheet.json", SHEET);
    let actions = write(
        dir.path(),
        "actions.json",
        r#"[{"action": "add_column", "params": {"columnId": "t", "title": "Tags", "type": "tags"}}]"#,
    );
    let out = dir.path().join("out.json");
    let (stdout, _, code) = run_command(
        dir.path(),
        &["replay", &sheet, &actions, "--out", out.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let result: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(result["tagCache"]["t"], serde_json::json!([]));
}

#[test]
fn test_replay_reports_failing_action() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "sheet.json", SHEET);
    let actions = write(
        dir.path(),
        "actions.json",
        r#"[
          {"action": "add_row", "params": {"rowId": "r3"}},
          {"action": "delete_row", "params": {"rowId": "missing"}}
        ]"#,
    );
    let (_, stderr, code) = run_command(dir.path(), &["replay", &sheet, &actions]);
    assert_ne!(code, 0);
    assert!(stderr.contains("action 1 (delete_row) failed"), "{stderr}");
}

#[test]
fn test_eval_prints_results_and_errors() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "sheet.json", SHEET);
    let (stdout, stderr, code) = run_command(dir.path(), &["eval", &sheet]);
    assert_eq!(code, 0, "{stderr}");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "r1\tf1\t8",
            "r1\tf2\t#ERR: Formula timed out",
            "r2\tf1\t2",
            "r2\tf2\t#ERR: Formula timed out",
        ]
    );
}

#[test]
fn test_functions_lists_builtins() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_command(dir.path(), &["functions"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("get_cell"));
    assert!(stdout.contains("to_dropdown_value"));
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "formula_timeout_ms = [").unwrap();
    let (_, stderr, code) = run_command(dir.path(), &["functions"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("config"), "{stderr}");
}

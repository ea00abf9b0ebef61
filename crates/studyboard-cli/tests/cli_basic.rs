//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyboard"))
        .args(args)
        .env("STUDYBOARD_DATA_DIR", data_dir)
        .env_remove("STUDYBOARD_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let (stdout, stderr, code) = run_cli(data_dir, &full);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

fn add(data_dir: &Path, name: &str) -> String {
    let subject = run_json(data_dir, &["subject", "add", name]);
    subject["id"].as_str().unwrap().to_string()
}

#[test]
fn test_subject_add_and_list() {
    let dir = TempDir::new().unwrap();
    let subject = run_json(dir.path(), &["subject", "add", "  Math  "]);
    assert_eq!(subject["name"], "Math");
    assert_eq!(subject["progress"], 0);
    assert_eq!(subject["totalTime"], 0);

    let (stdout, _, code) = run_cli(dir.path(), &["subject", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Math"));
    assert!(stdout.contains("Not Started"));
}

#[test]
fn test_subject_add_rejects_blank_name() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["subject", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_progress_clamps_and_filters() {
    let dir = TempDir::new().unwrap();
    let math = add(dir.path(), "Math");
    let art = add(dir.path(), "Art");

    let math_after = run_json(dir.path(), &["subject", "progress", &math, "40"]);
    assert_eq!(math_after["progress"], 40);
    let art_after = run_json(dir.path(), &["subject", "progress", &art, "150"]);
    assert_eq!(art_after["progress"], 100);

    let bumped = run_json(dir.path(), &["subject", "bump", &math, "-50"]);
    assert_eq!(bumped["progress"], 0);

    let board = run_json(dir.path(), &["subject", "list", "--filter", "completed"]);
    let names: Vec<&str> = board["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Art"]);
    assert_eq!(board["dashboard"]["count"], 2);
    assert_eq!(board["dashboard"]["completedCount"], 1);
}

#[test]
fn test_progress_rejects_non_numeric_input() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Math");
    let (_, stderr, code) = run_cli(dir.path(), &["subject", "progress", &id, "abc"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_list_sort_by_name() {
    let dir = TempDir::new().unwrap();
    for name in ["beta", "Alpha", "gamma"] {
        add(dir.path(), name);
    }
    let board = run_json(dir.path(), &["subject", "list", "--sort", "name"]);
    let names: Vec<&str> = board["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
}

#[test]
fn test_notes_and_show() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Chemistry");
    run_json(dir.path(), &["subject", "notes", &id, "<b>moles</b>"]);

    let shown = run_json(dir.path(), &["subject", "show", &id]);
    assert_eq!(shown["notes"], "<b>moles</b>");
}

#[test]
fn test_delete_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "History");

    let (_, stderr, code) = run_cli(dir.path(), &["subject", "delete", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));

    let (_, _, code) = run_cli(dir.path(), &["subject", "delete", &id, "--yes"]);
    assert_eq!(code, 0);

    let (_, stderr, code) = run_cli(dir.path(), &["subject", "show", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_focus_with_closed_stdin_credits_nothing() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Physics");

    let (stdout, _, code) = run_cli(dir.path(), &["focus", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Credited 0 min"));

    let shown = run_json(dir.path(), &["subject", "show", &id]);
    assert_eq!(shown["totalTime"], 0);
}

#[test]
fn test_focus_reads_enter_from_stdin() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Physics");

    let mut child = Command::new(env!("CARGO_BIN_EXE_studyboard"))
        .args(["focus", &id])
        .env("STUDYBOARD_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Press Enter"));
}

#[test]
fn test_focus_keeps_edits_made_while_waiting() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Physics");

    let mut child = Command::new(env!("CARGO_BIN_EXE_studyboard"))
        .args(["focus", &id])
        .env("STUDYBOARD_DATA_DIR", dir.path())
        .env_remove("STUDYBOARD_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Wait until the session is blocked on stdin.
    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        assert!(stderr.read_line(&mut line).unwrap() > 0, "focus exited early");
        if line.contains("Press Enter") {
            break;
        }
    }

    run_json(dir.path(), &["subject", "notes", &id, "chain rule"]);
    run_json(dir.path(), &["subject", "progress", &id, "60"]);

    child.stdin.take().unwrap().write_all(b"\n").unwrap();
    let status = child.wait().unwrap();
    assert!(status.success());
    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    assert!(stdout.contains("Credited 0 min"));

    let shown = run_json(dir.path(), &["subject", "show", &id]);
    assert_eq!(shown["notes"], "chain rule");
    assert_eq!(shown["progress"], 60);
    assert_eq!(shown["totalTime"], 0);
}

#[test]
fn test_focus_on_subject_deleted_while_waiting_fails() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Physics");

    let mut child = Command::new(env!("CARGO_BIN_EXE_studyboard"))
        .args(["focus", &id])
        .env("STUDYBOARD_DATA_DIR", dir.path())
        .env_remove("STUDYBOARD_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        assert!(stderr.read_line(&mut line).unwrap() > 0, "focus exited early");
        if line.contains("Press Enter") {
            break;
        }
    }

    let (_, _, code) = run_cli(dir.path(), &["subject", "delete", &id, "--yes"]);
    assert_eq!(code, 0);

    child.stdin.take().unwrap().write_all(b"\n").unwrap();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(1));
    let mut rest = String::new();
    stderr.read_to_string(&mut rest).unwrap();
    assert!(rest.contains("deleted during the session"));

    let board = run_json(dir.path(), &["subject", "list"]);
    assert!(board["subjects"].as_array().unwrap().is_empty());
}

#[test]
fn test_edit_unknown_id_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["subject", "edit", "ghost", "--progress", "lots"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_config_default_filter_accepts_kebab_case() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["config", "set", "board.default_filter", "in-progress"],
    );
    assert_eq!(code, 0, "{stderr}");

    let math = add(dir.path(), "Math");
    add(dir.path(), "Art");
    run_json(dir.path(), &["subject", "progress", &math, "30"]);
    let board = run_json(dir.path(), &["subject", "list"]);
    let subjects = board["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["name"], "Math");
}

#[test]
fn test_list_html_escapes_names() {
    let dir = TempDir::new().unwrap();
    add(dir.path(), "Tom & Jerry <3");
    let (stdout, _, code) = run_cli(dir.path(), &["subject", "list", "--html"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("<h3>Tom &amp; Jerry &lt;3</h3>"));
    assert!(stdout.contains("subject-card not-started"));
}

#[test]
fn test_stats_on_empty_store() {
    let dir = TempDir::new().unwrap();
    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["count"], 0);
    assert_eq!(stats["averageProgress"], 0);
    assert_eq!(stats["totalMinutes"], 0);
}

#[test]
fn test_export_empty_store_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("backup.json");
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["data", "export", "--out", out.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(!out.exists());
}

#[test]
fn test_export_then_import_into_other_store() {
    let source = TempDir::new().unwrap();
    let id = add(source.path(), "Biology");
    run_json(source.path(), &["subject", "progress", &id, "55"]);

    let out = source.path().join("backup.json");
    let (_, _, code) = run_cli(
        source.path(),
        &["data", "export", "--out", out.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    let backup: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(backup["version"], "1.0");
    assert!(backup["exportedAt"].is_string());

    let target = TempDir::new().unwrap();
    add(target.path(), "Chemistry");
    let (_, stderr, code) = run_cli(target.path(), &["data", "import", out.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--yes"));

    let (_, _, code) = run_cli(
        target.path(),
        &["data", "import", out.to_str().unwrap(), "--yes"],
    );
    assert_eq!(code, 0);

    let shown = run_json(target.path(), &["subject", "show", &id]);
    assert_eq!(shown["name"], "Biology");
    assert_eq!(shown["progress"], 55);
    let board = run_json(target.path(), &["subject", "list"]);
    assert_eq!(board["subjects"].as_array().unwrap().len(), 1);
}

#[test]
fn test_import_malformed_file_keeps_store() {
    let dir = TempDir::new().unwrap();
    add(dir.path(), "Latin");
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"subjects": "nope"}"#).unwrap();

    let (_, _, code) = run_cli(dir.path(), &["data", "import", bad.to_str().unwrap(), "--yes"]);
    assert_eq!(code, 1);

    let board = run_json(dir.path(), &["subject", "list"]);
    assert_eq!(board["subjects"].as_array().unwrap().len(), 1);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "board.default_sort"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "recent");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "board.default_sort", "name"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "board.default_sort"]);
    assert_eq!(stdout.trim(), "name");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

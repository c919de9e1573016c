//! Integration tests for the `cn` CLI.
//!
//! Each test runs `cn` as a subprocess against its own temp data directory
//! and verifies stdout and/or on-disk state.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the path to the built `cn` binary.
fn cn_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cn");
    path
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(cn_bin())
        .arg("-C")
        .arg(dir.path())
        .args(args)
        .output()
        .expect("failed to run cn")
}

/// Run and require success, returning stdout
fn run_ok(dir: &TempDir, args: &[&str]) -> String {
    let out = run(dir, args);
    assert!(
        out.status.success(),
        "cn {:?} failed:\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
    String::from_utf8(out.stdout).unwrap()
}

/// Add a task and return its id
fn add(dir: &TempDir, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let stdout = run_ok(dir, &full);
    stdout
        .trim()
        .strip_prefix("added ")
        .expect("add output")
        .to_string()
}

fn sub(dir: &TempDir, parent: &str, title: &str) -> String {
    let stdout = run_ok(dir, &["sub", parent, title]);
    stdout
        .trim()
        .strip_prefix("added ")
        .expect("sub output")
        .to_string()
}

// ---------------------------------------------------------------------------
// Basics
// ---------------------------------------------------------------------------

#[test]
fn add_and_list() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Write the launch post"]);

    let listing = run_ok(&dir, &["list"]);
    assert!(listing.contains("[ ] Write the launch post"));
    assert!(listing.contains(&id));
}

#[test]
fn list_empty_tree() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_ok(&dir, &["list"]).trim(), "no tasks");
}

#[test]
fn add_rejects_empty_title() {
    let dir = TempDir::new().unwrap();
    let out = run(&dir, &["add", "   "]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("title cannot be empty"));
}

#[test]
fn unknown_id_is_an_error_at_the_cli_boundary() {
    let dir = TempDir::new().unwrap();
    let out = run(&dir, &["toggle", "no-such-id"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("task not found"));
}

#[test]
fn show_details() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &[
        "Fix the flaky test",
        "--description",
        "It fails on slow machines.",
        "--priority",
        "urgent",
    ]);

    let detail = run_ok(&dir, &["show", &id]);
    assert!(detail.contains("Fix the flaky test"));
    assert!(detail.contains("priority: urgent"));
    assert!(detail.contains("status: todo"));
    assert!(detail.contains("It fails on slow machines."));
}

// ---------------------------------------------------------------------------
// Completion propagation
// ---------------------------------------------------------------------------

#[test]
fn toggle_parent_cascades_to_all_depths() {
    let dir = TempDir::new().unwrap();
    let parent = add(&dir, &["Parent"]);
    let child = sub(&dir, &parent, "Child");
    let _grandchild = sub(&dir, &child, "Grandchild");

    run_ok(&dir, &["toggle", &parent]);
    let listing = run_ok(&dir, &["list"]);
    assert_eq!(listing.matches("[x]").count(), 3);

    // Un-completing resumes work: descendants land on in-progress
    run_ok(&dir, &["toggle", &parent]);
    let listing = run_ok(&dir, &["list"]);
    assert_eq!(listing.matches("[>]").count(), 3);
}

#[test]
fn completing_every_child_completes_the_parent() {
    let dir = TempDir::new().unwrap();
    let parent = add(&dir, &["Parent"]);
    let a = sub(&dir, &parent, "First child");
    let b = sub(&dir, &parent, "Second child");

    run_ok(&dir, &["toggle", &a]);
    let detail = run_ok(&dir, &["show", &parent]);
    assert!(detail.contains("status: todo"), "one open child keeps the parent open");

    run_ok(&dir, &["toggle", &b]);
    let detail = run_ok(&dir, &["show", &parent]);
    assert!(detail.contains("status: completed"));

    // Re-opening a child immediately re-opens the parent
    run_ok(&dir, &["toggle", &a]);
    let detail = run_ok(&dir, &["show", &parent]);
    assert!(detail.contains("status: in-progress"));
}

#[test]
fn status_cycle_is_closed_after_four_steps() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Cycler"]);

    let expected = ["in-progress", "paused", "completed", "todo"];
    for status in expected {
        let stdout = run_ok(&dir, &["status", &id]);
        assert_eq!(stdout.trim(), format!("status: {}", status));
    }
}

#[test]
fn priority_cycle_is_closed_after_four_steps() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Cycler"]);

    let expected = ["high", "urgent", "low", "medium"];
    for priority in expected {
        let stdout = run_ok(&dir, &["priority", &id]);
        assert_eq!(stdout.trim(), format!("priority: {}", priority));
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[test]
fn path_walks_from_root_to_task() {
    let dir = TempDir::new().unwrap();
    let root = add(&dir, &["Root"]);
    let mid = sub(&dir, &root, "Middle");
    let leaf = sub(&dir, &mid, "Leaf");

    let stdout = run_ok(&dir, &["path", &leaf]);
    let ids: Vec<&str> = stdout.lines().collect();
    assert_eq!(ids, vec![root.as_str(), mid.as_str(), leaf.as_str()]);
}

#[test]
fn delete_removes_the_whole_subtree() {
    let dir = TempDir::new().unwrap();
    let root = add(&dir, &["Root"]);
    let child = sub(&dir, &root, "Child");
    let grandchild = sub(&dir, &child, "Grandchild");

    run_ok(&dir, &["delete", "--yes", &child]);

    let listing = run_ok(&dir, &["list"]);
    assert!(listing.contains("Root"));
    assert!(!listing.contains("Child"));
    assert!(!listing.contains("Grandchild"));
    assert!(!run(&dir, &["show", &grandchild]).status.success());
}

#[test]
fn sub_requires_an_existing_parent() {
    let dir = TempDir::new().unwrap();
    let out = run(&dir, &["sub", "ghost-parent", "Orphan"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("task not found"));
}

#[test]
fn edit_updates_fields() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Old title"]);

    run_ok(&dir, &["edit", &id, "--title", "New title", "--priority", "high"]);
    let detail = run_ok(&dir, &["show", &id]);
    assert!(detail.contains("New title"));
    assert!(detail.contains("priority: high"));

    let out = run(&dir, &["edit", &id]);
    assert!(!out.status.success(), "edit with no fields is rejected");
}

// ---------------------------------------------------------------------------
// JSON output and bulk commands
// ---------------------------------------------------------------------------

#[test]
fn list_json_exposes_the_wire_format() {
    let dir = TempDir::new().unwrap();
    let root = add(&dir, &["Root"]);
    sub(&dir, &root, "Child");

    let stdout = run_ok(&dir, &["list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value[0]["title"], "Root");
    assert_eq!(value[0]["children"][0]["title"], "Child");
    assert_eq!(value[0]["children"][0]["parentId"], value[0]["id"]);
}

#[test]
fn stats_counts_by_status() {
    let dir = TempDir::new().unwrap();
    let a = add(&dir, &["One"]);
    add(&dir, &["Two"]);
    run_ok(&dir, &["toggle", &a]);

    let stdout = run_ok(&dir, &["stats", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["completed"], 1);
    assert_eq!(value["todo"], 1);
}

#[test]
fn sample_refuses_to_clobber_then_clear_makes_room() {
    let dir = TempDir::new().unwrap();
    add(&dir, &["Precious"]);

    let out = run(&dir, &["sample"]);
    assert!(!out.status.success());

    run_ok(&dir, &["clear", "--yes"]);
    assert_eq!(run_ok(&dir, &["list"]).trim(), "no tasks");

    run_ok(&dir, &["sample"]);
    let stdout = run_ok(&dir, &["stats", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(value["total"].as_u64().unwrap() > 0);
}

#[test]
fn data_survives_between_invocations() {
    let dir = TempDir::new().unwrap();
    let id = add(&dir, &["Durable"]);
    run_ok(&dir, &["toggle", &id]);

    // A fresh process sees the completed task
    let detail = run_ok(&dir, &["show", &id]);
    assert!(detail.contains("status: completed"));
}

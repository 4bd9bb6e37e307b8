//! Integration tests for the `th` CLI.
//!
//! Each test builds a temp vault, runs `th` as a subprocess, and checks
//! stdout and/or file contents.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Lay out a small vault: a root note, a Work folder and a Home folder.
fn create_test_vault(root: &Path) {
    fs::create_dir_all(root.join("Work")).unwrap();
    fs::create_dir_all(root.join("Home")).unwrap();

    fs::write(
        root.join("Notes.md"),
        "\
# Work

- [ ] Buy milk #errand
  - [x] Call store
- [x] Finished root
",
    )
    .unwrap();

    fs::write(
        root.join("Work/plan.md"),
        "\
# Launch

- [ ] Ship it #release
  - [ ] Write notes
- [ ] Tell people
",
    )
    .unwrap();

    fs::write(root.join("Home/chores.md"), "- [ ] Water plants\n").unwrap();
    fs::write(root.join("Home/readme.txt"), "- [ ] not markdown\n").unwrap();
}

/// Run `th` with the given args in the given directory, returning (stdout, stderr, success).
fn run_th(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_th"))
        .args(args)
        .current_dir(dir)
        .env_remove("TASKHUB_LOG")
        .output()
        .expect("failed to run th");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `th` expecting success, return stdout.
fn run_th_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_th(dir, args);
    if !success {
        panic!("th {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

fn vault() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    run_th_ok(tmp.path(), &["init"]);
    tmp
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_settings_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_th_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized taskhub vault"));
    let settings = fs::read_to_string(tmp.path().join(".taskhub/settings.toml")).unwrap();
    assert!(settings.contains("# taskhub settings"));

    let (_, stderr, success) = run_th(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already initialized"));

    run_th_ok(tmp.path(), &["init", "--force"]);
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn test_list_groups_by_folder_and_file() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["list"]);

    assert!(out.contains("(vault root)/"));
    assert!(out.contains("Work/"));
    assert!(out.contains("Home/"));
    assert!(out.contains("  Notes.md (1/2)"));
    assert!(out.contains("    # Work (1/2)"));
    assert!(out.contains("[ ] Buy milk #errand  :3  (1/2)"));
    assert!(out.contains("[x] Call store  :4"));
    assert!(out.contains("[ ] Water plants  :1"));
    // completed roots stay out by default
    assert!(!out.contains("Finished root"));
    assert!(!out.contains("not markdown"));

    // folders sort by name, with the vault root first
    let root = out.find("(vault root)/").unwrap();
    let home = out.find("Home/").unwrap();
    let work = out.find("Work/").unwrap();
    assert!(root < home && home < work);
}

#[test]
fn test_list_done_flag_and_settings_default() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["list", "--done"]);
    assert!(out.contains("[x] Finished root  :5"));

    fs::write(tmp.path().join(".taskhub/settings.toml"), "show_done = true\n").unwrap();
    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(out.contains("Finished root"));
    let out = run_th_ok(tmp.path(), &["list", "--no-done"]);
    assert!(!out.contains("Finished root"));
}

#[test]
fn test_list_filter_keeps_matching_roots_with_subtrees() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["list", "--filter", "NOTES"]);
    // matches the child text, so the whole root comes along
    assert!(out.contains("Ship it #release"));
    assert!(out.contains("Write notes"));
    // matches the path Notes.md
    assert!(out.contains("Buy milk"));
    assert!(!out.contains("Water plants"));
    assert!(!out.contains("Tell people"));
}

#[test]
fn test_list_tags_view() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["list", "--view", "tags"]);
    assert!(out.contains("#errand (1)"));
    assert!(out.contains("  [ ] Buy milk #errand  Notes.md:3"));
    assert!(out.contains("#release (1)"));
    assert!(out.contains("untagged"));
    assert!(out.contains("  [ ] Write notes  Work/plan.md:4"));
}

#[test]
fn test_list_focus_view_uses_active_folder() {
    let tmp = vault();
    let out = run_th_ok(
        tmp.path(),
        &["list", "--view", "focus", "--active", "Work/plan.md"],
    );
    assert!(out.contains("Work/plan.md"));
    assert!(out.contains("Ship it"));
    assert!(!out.contains("Water plants"));
    assert!(!out.contains("Buy milk"));

    let out = run_th_ok(tmp.path(), &["list", "--view", "focus"]);
    assert!(out.contains("No tasks in the active folder"));
}

#[test]
fn test_list_json() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["list", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(json["view"], "files");
    assert_eq!(json["show_done"], false);
    assert_eq!(json["hidden_count"], 0);
    let folders = json["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 3);
    assert_eq!(folders[0]["folder"], "");

    let notes = &folders[0]["files"][0];
    assert_eq!(notes["path"], "Notes.md");
    assert_eq!(notes["name"], "Notes");
    let buy = &notes["headings"][0]["tasks"][0];
    assert_eq!(buy["text"], "Buy milk #errand");
    assert_eq!(buy["line"], 3);
    assert_eq!(buy["kind"], "original");
    assert_eq!(buy["count"]["done"], 1);
    assert_eq!(buy["count"]["total"], 2);
    assert_eq!(buy["children"][0]["text"], "Call store");
}

#[test]
fn test_list_rejects_unknown_view() {
    let tmp = vault();
    let (_, stderr, success) = run_th(tmp.path(), &["list", "--view", "kanban"]);
    assert!(!success);
    assert!(stderr.contains("unknown view"));
}

#[test]
fn test_vault_dir_flag_and_discovery_from_subfolder() {
    let tmp = vault();
    let elsewhere = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().to_str().unwrap();
    let out = run_th_ok(elsewhere.path(), &["-C", dir, "list"]);
    assert!(out.contains("Buy milk"));

    // run from inside Work/: the vault root is found by walking up
    let out = run_th_ok(&tmp.path().join("Work"), &["list"]);
    assert!(out.contains("Buy milk"));
    assert!(out.contains("Water plants"));
}

// ---------------------------------------------------------------------------
// toggle
// ---------------------------------------------------------------------------

#[test]
fn test_toggle_rewrites_only_the_marker() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["toggle", "Notes.md", "3"]);
    assert_eq!(out.trim(), "[x] Buy milk #errand");

    let content = fs::read_to_string(tmp.path().join("Notes.md")).unwrap();
    assert!(content.contains("- [x] Buy milk #errand\n  - [x] Call store\n"));

    let out = run_th_ok(tmp.path(), &["toggle", "Notes.md", "4"]);
    assert_eq!(out.trim(), "[ ] Call store");
    let content = fs::read_to_string(tmp.path().join("Notes.md")).unwrap();
    assert!(content.contains("  - [ ] Call store\n"));
}

#[test]
fn test_toggle_without_task_fails() {
    let tmp = vault();
    let (_, stderr, success) = run_th(tmp.path(), &["toggle", "Notes.md", "1"]);
    assert!(!success);
    assert!(stderr.contains("no task at Notes.md:1"));
}

// ---------------------------------------------------------------------------
// hide / unhide
// ---------------------------------------------------------------------------

#[test]
fn test_hide_task_moves_it_to_hidden() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["hide", "task", "Notes.md", "4"]);
    assert!(out.contains("hid task \"Call store\""));

    let settings = fs::read_to_string(tmp.path().join(".taskhub/settings.toml")).unwrap();
    assert!(settings.contains("hidden_tasks"));
    assert!(settings.contains("Notes.md::Call store"));
    // the template's comments survive the rewrite
    assert!(settings.contains("# taskhub settings"));

    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(out.contains("-- Hidden (1) --"));
    assert!(!out.contains("Call store"));

    let out = run_th_ok(tmp.path(), &["hidden"]);
    assert!(out.contains("Buy milk #errand  :3  (1/2)  (context)"));
    assert!(out.contains("Call store"));
    assert!(out.contains("hidden tasks:"));

    let out = run_th_ok(tmp.path(), &["hide", "task", "Notes.md", "4"]);
    assert!(out.contains("already hidden"));

    let out = run_th_ok(tmp.path(), &["unhide", "task", "Notes.md", "4"]);
    assert!(out.contains("unhid task"));
    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(out.contains("Call store"));
    assert!(!out.contains("Hidden"));
}

#[test]
fn test_hide_file_and_folder() {
    let tmp = vault();
    run_th_ok(tmp.path(), &["hide", "file", "Work/plan.md"]);
    run_th_ok(tmp.path(), &["hide", "folder", "Home"]);

    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Ship it"));
    assert!(!out.contains("Water plants"));
    assert!(out.contains("-- Hidden (3) --"));

    let out = run_th_ok(tmp.path(), &["hidden", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["hidden_files"][0], "Work/plan.md");
    assert_eq!(json["hidden_folders"][0], "Home");

    // unhiding the folder also clears hide entries for files inside it
    run_th_ok(tmp.path(), &["unhide", "folder", "Work"]);
    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(out.contains("Ship it"));
    assert!(!out.contains("Water plants"));
}

// ---------------------------------------------------------------------------
// exclude / include
// ---------------------------------------------------------------------------

#[test]
fn test_exclude_and_include_folder() {
    let tmp = vault();
    let out = run_th_ok(tmp.path(), &["exclude", "Work/"]);
    assert!(out.contains("excluded Work"));

    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Ship it"));
    assert!(!out.contains("Hidden"));

    let out = run_th_ok(tmp.path(), &["exclude", "Work"]);
    assert!(out.contains("already excluded"));

    run_th_ok(tmp.path(), &["include", "Work"]);
    let out = run_th_ok(tmp.path(), &["list"]);
    assert!(out.contains("Ship it"));
}

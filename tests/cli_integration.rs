#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        fs::create_dir(dir.path().join(".git")).expect("fake repo marker");
        Self { dir }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join(".tasks")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("dot-tasks").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("DOT_TASKS_LOG");
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut a: Vec<&str> = args.to_vec();
        a.push("--json");
        let output = self.cmd().args(&a).output().expect("run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }

    fn run_ok(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], true, "expected success=true: {v}");
        v
    }

    fn run_err(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        v
    }

    fn create(&self, args: &[&str]) -> String {
        let mut a = vec!["create"];
        a.extend_from_slice(args);
        let v = self.run_ok(&a);
        v["data"]["task_id"].as_str().unwrap().to_string()
    }
}

fn initialized() -> TestEnv {
    let env = TestEnv::new();
    env.run_ok(&["init"]);
    env
}

// ─── 1. init ───────────────────────────────────────────────────────

#[test]
fn test_init_creates_layout_and_config() {
    let env = TestEnv::new();
    let v = env.run_ok(&["init"]);
    assert_eq!(v["data"]["config_status"], "created");
    for bucket in ["todo", "doing", "done", "trash"] {
        assert!(env.root().join(bucket).is_dir(), "{bucket}");
    }
    assert!(env.root().join("config.yaml").is_file());
}

#[test]
fn test_init_idempotent() {
    let env = initialized();
    let v = env.run_ok(&["init"]);
    assert_eq!(v["data"]["config_status"], "existing");
}

#[test]
fn test_init_updates_settings_and_keeps_unknown_keys() {
    let env = initialized();
    let cfg = env.root().join("config.yaml");
    let mut text = fs::read_to_string(&cfg).unwrap();
    text.push_str("custom: kept\n");
    fs::write(&cfg, text).unwrap();

    let v = env.run_ok(&["init", "--show-banner", "false", "--columns", "task_id,status"]);
    assert_eq!(v["data"]["config_status"], "updated");
    assert_eq!(v["data"]["show_banner"], false);

    let text = fs::read_to_string(&cfg).unwrap();
    assert!(text.contains("custom: kept"));
    assert!(text.contains("show_banner: false"));
}

#[test]
fn test_init_required_before_commands() {
    let env = TestEnv::new();
    let v = env.run_err(&["list"]);
    assert_eq!(v["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn test_explicit_root_must_exist() {
    let env = TestEnv::new();
    let v = env.run_err(&["--tasks-root", "nowhere", "list"]);
    assert_eq!(v["error"]["code"], "NOT_INITIALIZED");
    assert!(v["error"]["message"].as_str().unwrap().contains("tasks root not found"));
}

// ─── 2. create / view ──────────────────────────────────────────────

#[test]
fn test_create_and_view() {
    let env = initialized();
    let id = env.create(&["fix-login", "--summary", "Redirect loop", "--priority", "p1", "--tag", "auth"]);
    assert!(id.starts_with("t-"));
    assert!(id.ends_with("-001"));

    let v = env.run_ok(&["view", "fix-login"]);
    assert_eq!(v["data"]["metadata"]["task_id"], id.as_str());
    assert_eq!(v["data"]["metadata"]["priority"], "p1");
    assert_eq!(v["data"]["metadata"]["tags"][0], "auth");
    assert_eq!(v["data"]["dependency_health"]["label"], "ready");
    assert!(v["data"]["body"].as_str().unwrap().contains("- Redirect loop"));

    let path = PathBuf::from(v["data"]["path"].as_str().unwrap());
    assert!(path.starts_with(env.root().join("todo")));
    assert!(path.join("activity.md").is_file());
}

#[test]
fn test_create_rejects_bad_input() {
    let env = initialized();
    let v = env.run_err(&["create", "Not_Kebab"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");

    let v = env.run_err(&["create", "ok-name", "--priority", "p9"]);
    assert_eq!(v["error"]["message"], "Invalid priority: p9");

    env.create(&["dup"]);
    let v = env.run_err(&["create", "dup"]);
    assert_eq!(v["error"]["code"], "NAME_CONFLICT");

    let v = env.run_err(&["create", "needs-ghost", "--depends-on", "ghost"]);
    assert_eq!(v["error"]["code"], "TASK_NOT_FOUND");
}

#[test]
fn test_view_not_found_text_mode() {
    let env = initialized();
    env.cmd()
        .args(["view", "missing-task"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Task not found: missing-task"));
}

// ─── 3. lifecycle ──────────────────────────────────────────────────

#[test]
fn test_start_requires_dependencies() {
    let env = initialized();
    let dep_id = env.create(&["dep"]);
    env.create(&["main", "--depends-on", "dep"]);

    let v = env.run_err(&["start", "main"]);
    assert_eq!(v["error"]["code"], "UNMET_DEPENDENCIES");
    assert!(v["error"]["message"].as_str().unwrap().contains(&dep_id));

    env.run_ok(&["complete", "dep"]);
    let v = env.run_ok(&["start", "main"]);
    let path = PathBuf::from(v["data"]["path"].as_str().unwrap());
    assert!(path.starts_with(env.root().join("doing")));
    assert!(path.join("plan.md").is_file());
}

#[test]
fn test_force_start_and_complete_twice() {
    let env = initialized();
    env.create(&["dep"]);
    env.create(&["main", "--depends-on", "dep"]);
    env.run_ok(&["start", "main", "--force"]);

    env.run_ok(&["complete", "main"]);
    let v = env.run_ok(&["complete", "main"]);
    assert_eq!(v["data"]["status"], "completed");

    let v = env.run_err(&["start", "main"]);
    assert_eq!(v["error"]["message"], "Cannot start a completed task");
}

#[test]
fn test_update_rename_and_log() {
    let env = initialized();
    let a_id = env.create(&["alpha"]);
    env.create(&["beta"]);
    env.run_ok(&["update", "beta", "--depends-on", "alpha", "--tag", "x", "--note", "wired"]);

    let v = env.run_err(&["update", "alpha", "--depends-on", "beta"]);
    assert_eq!(v["error"]["code"], "CYCLE_DETECTED");

    let v = env.run_ok(&["rename", "alpha", "alpha-two"]);
    assert_eq!(v["data"]["task_id"], a_id.as_str());

    let v = env.run_ok(&["view", "beta"]);
    assert_eq!(v["data"]["metadata"]["depends_on"][0], a_id.as_str());
    assert_eq!(v["data"]["dependencies"][0]["task_name"], "alpha-two");

    env.run_ok(&["log", "beta", "paired on it", "--actor", "sam"]);
    let path = PathBuf::from(v["data"]["path"].as_str().unwrap());
    let activity = fs::read_to_string(path.join("activity.md")).unwrap();
    assert!(activity.contains("| human | update | wired"));
    assert!(activity.contains("| sam | update | paired on it"));
}

#[test]
fn test_delete_soft_then_hard() {
    let env = initialized();
    env.create(&["dep"]);
    env.create(&["main", "--depends-on", "dep"]);

    env.cmd()
        .args(["delete", "dep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to trash: dep"));

    let v = env.run_ok(&["view", "main"]);
    assert_eq!(v["data"]["dependencies"][0]["task_name"], "missing");
    assert_eq!(v["data"]["dependencies"][0]["status"], "unknown");

    // the dangling reference does not block later mutations
    env.run_ok(&["update", "main", "--priority", "p0"]);

    env.run_ok(&["delete", "dep", "--hard"]);
    let trash: Vec<_> = fs::read_dir(env.root().join("trash")).unwrap().collect();
    assert!(trash.is_empty());
}

// ─── 4. list / tags ────────────────────────────────────────────────

#[test]
fn test_list_filters_and_health() {
    let env = initialized();
    env.create(&["api-work", "--tag", "api"]);
    env.create(&["ui-work", "--tag", "ui", "--depends-on", "api-work"]);
    env.create(&["chore"]);

    let v = env.run_ok(&["list"]);
    let rows = v["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    let ui = rows.iter().find(|r| r["task_name"] == "ui-work").unwrap();
    assert_eq!(ui["dependency_health"], "blocked(1)");

    let v = env.run_ok(&["list", "--tag", "ui"]);
    assert_eq!(v["data"].as_array().unwrap().len(), 1);

    let v = env.run_ok(&["list", "--untagged"]);
    assert_eq!(v["data"][0]["task_name"], "chore");

    let v = env.run_ok(&["list", "done"]);
    assert!(v["data"].as_array().unwrap().is_empty());

    let v = env.run_err(&["list", "later"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
}

#[test]
fn test_list_text_table() {
    let env = initialized();
    env.create(&["a-task-with-a-very-long-name-indeed-yes"]);
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("task_name"))
        .stdout(predicate::str::contains("a-task-with-a-very-long-name-in…"));
}

#[test]
fn test_tags_sort_and_limit() {
    let env = initialized();
    env.create(&["one", "--tag", "b"]);
    env.create(&["two", "--tag", "b", "--tag", "a"]);
    env.create(&["three"]);

    let v = env.run_ok(&["tags"]);
    let rows = v["data"].as_array().unwrap();
    assert_eq!(rows[0]["tag"], "b");
    assert_eq!(rows[0]["total"], 2);

    let v = env.run_ok(&["tags", "--sort", "name", "--limit", "1"]);
    assert_eq!(v["data"].as_array().unwrap().len(), 1);
    assert_eq!(v["data"][0]["tag"], "(untagged)");

    let v = env.run_ok(&["tags", "--no-untagged", "--sort", "name"]);
    assert_eq!(v["data"][0]["tag"], "a");
}

#[test]
fn test_config_warnings_go_to_stderr() {
    let env = initialized();
    fs::write(env.root().join("config.yaml"), "settings:\n  colour: red\n").unwrap();
    env.create(&["alpha"]);
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: Unsupported settings key 'colour'"));
}

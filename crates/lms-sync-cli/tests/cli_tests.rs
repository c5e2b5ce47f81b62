//! End-to-end tests that run the built `hf-lms-sync` binary.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Env {
    temp: TempDir,
    source: PathBuf,
    target: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let source = temp.path().join("hub");
        let target = temp.path().join("models");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        Self {
            temp,
            source,
            target,
        }
    }

    fn add_model(&self, org: &str, name: &str) -> PathBuf {
        let root = self.source.join(format!("models--{org}--{name}"));
        let snapshot = root.join("snapshots").join("v1");
        fs::create_dir_all(&snapshot).unwrap();
        fs::write(snapshot.join("weights.bin"), b"weights").unwrap();
        root
    }

    /// Run the binary against this environment's roots. The settings file
    /// points into the temp dir so the user's real settings never leak in.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_hf-lms-sync"))
            .arg("--source")
            .arg(&self.source)
            .arg("--target")
            .arg(&self.target)
            .args(args)
            .current_dir(self.temp.path())
            .env("HF_LMS_SYNC_CONFIG", self.temp.path().join("settings.json"))
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run hf-lms-sync")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_default_command_lists_models() {
    let env = Env::new();
    env.add_model("acme", "widget");

    let output = env.run(&[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("acme/widget"));
    assert!(text.contains("1 models (0 linked, 1 not linked, 0 stale)"));
}

#[test]
fn test_link_and_unlink_one_model() {
    let env = Env::new();
    env.add_model("acme", "widget");

    let output = env.run(&["link", "acme/widget"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Linked model: widget");
    assert!(env.target.join("acme/widget/weights.bin").is_symlink());
    assert!(env.target.join("acme/widget/.hf-lms-sync").is_file());

    let output = env.run(&["list", "--linked"]);
    assert!(stdout(&output).contains("[linked] acme/widget"));

    let output = env.run(&["unlink", "acme/widget"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Unlinked model: widget");
    assert!(!env.target.join("acme/widget").exists());
}

#[test]
fn test_batch_commands() {
    let env = Env::new();
    env.add_model("acme", "widget");
    let gadget = env.add_model("acme", "gadget");

    let output = env.run(&["link-all"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Successfully linked 2 models");

    fs::remove_dir_all(gadget).unwrap();
    let output = env.run(&["stale"]);
    assert!(stdout(&output).contains("[stale]  acme/gadget (Source directory not found)"));

    let output = env.run(&["purge-all"]);
    assert_eq!(stdout(&output).trim(), "Successfully purged 1 stale links");

    let output = env.run(&["unlink-all"]);
    assert_eq!(stdout(&output).trim(), "Successfully unlinked 1 models");
}

#[test]
fn test_json_output() {
    let env = Env::new();
    env.add_model("acme", "widget");

    let output = env.run(&["--json", "list"]);
    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records[0]["organization"], "acme");
    assert_eq!(records[0]["is_linked"], false);

    let output = env.run(&["link", "acme/widget", "--json"]);
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["status"], "Linked model: widget");
    assert_eq!(outcome["link"]["files_linked"], 1);
    assert_eq!(outcome["link"]["snapshots"][0], "v1");
    assert_eq!(outcome["snapshot"]["artifacts"][0]["is_linked"], true);
}

#[test]
fn test_link_all_keeps_user_directory_and_reports_once() {
    let env = Env::new();
    env.add_model("acme", "widget");
    let user_dir = env.target.join("acme/widget");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("my-finetune.gguf"), b"mine").unwrap();

    let output = env.run(&["link-all"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim(), "Successfully linked 0 models");
    assert!(user_dir.join("my-finetune.gguf").is_file());

    let errors = stderr(&output);
    assert_eq!(
        errors.matches("is not managed by hf-lms-sync").count(),
        1,
        "stderr: {errors}"
    );
}

#[test]
fn test_verbose_batch_failures_reach_stderr() {
    let env = Env::new();
    env.add_model("acme", "widget");
    fs::create_dir_all(env.target.join("acme/widget")).unwrap();
    fs::write(env.target.join("acme/widget/my-finetune.gguf"), b"mine").unwrap();
    let log = env.temp.path().join("sync.log");

    let output = env.run(&["--verbose", "--log-file", log.to_str().unwrap(), "link-all"]);
    assert_eq!(output.status.code(), Some(1));
    let errors = stderr(&output);
    assert!(errors.contains("failed: acme/widget"), "stderr: {errors}");
    assert_eq!(errors.matches("is not managed by hf-lms-sync").count(), 1);
}

#[test]
fn test_unknown_model_fails() {
    let env = Env::new();
    let output = env.run(&["link", "nobody/nothing"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Model not found: nobody/nothing"));
}

#[test]
fn test_missing_target_root_is_configuration_error() {
    let env = Env::new();
    fs::remove_dir_all(&env.target).unwrap();

    let output = env.run(&["list"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_link_creates_missing_target_root() {
    let env = Env::new();
    env.add_model("acme", "widget");
    fs::remove_dir_all(&env.target).unwrap();

    let output = env.run(&["link-all"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(env.target.join("acme/widget").is_dir());
}

#[test]
fn test_verbose_writes_log_file() {
    let env = Env::new();
    env.add_model("acme", "widget");
    let log = env.temp.path().join("sync.log");

    let output = env.run(&["--verbose", "--log-file", log.to_str().unwrap(), "link-all"]);
    assert!(output.status.success());
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Linked acme/widget"));
}

#[test]
fn test_verbose_default_log_file_in_working_dir() {
    let env = Env::new();
    let output = env.run(&["-v", "list"]);
    assert!(output.status.success());
    assert!(Path::new(&env.temp.path().join("hf-lms-sync.log")).is_file());
}

#[test]
fn test_settings_file_supplies_roots() {
    let env = Env::new();
    env.add_model("acme", "widget");
    let settings = env.temp.path().join("custom.json");
    fs::write(
        &settings,
        serde_json::json!({
            "source_root": env.source,
            "target_root": env.target,
            "snapshot_policy": "latest"
        })
        .to_string(),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_hf-lms-sync"))
        .args(["--json", "--config"])
        .arg(&settings)
        .arg("paths")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let paths: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(paths["target_root"], env.target.to_str().unwrap());
    assert_eq!(paths["snapshot_policy"], "latest");
}

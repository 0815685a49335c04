//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>1.2.3</Version>
  </PropertyGroup>
</Project>
"#;

const ACTIONS_VARS: &[&str] = &[
    "GITHUB_WORKSPACE",
    "GITHUB_EVENT_PATH",
    "GITHUB_TOKEN",
    "GITHUB_REF",
    "GITHUB_HEAD_REF",
    "GITHUB_OUTPUT",
    "GITHUB_ACTIONS",
    "INPUT_TAG-PREFIX",
    "INPUT_VERSION-PART",
    "INPUT_PATH-TO-FILE",
    "INPUT_TYPE",
    "INPUT_DRY-RUN",
    "INPUT_SKIP-TAG",
    "INPUT_SKIP-COMMIT",
    "INPUT_SKIP-PUSH",
    "INPUT_PRE-RELEASE-ID",
    "INPUT_VERSION-OVERRIDE",
    "BUMPKIN_LOG_PATH",
    "BUMPKIN_LOG_DIR",
    "RUST_LOG",
];

/// Returns a Command for our binary, isolated from the host's CI
/// environment and user config.
#[allow(deprecated)]
fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    for var in ACTIONS_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// A workspace with a csproj and a separate home directory.
struct Workspace {
    home: TempDir,
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join(".git")).unwrap();
        fs::write(root.path().join("App.csproj"), CSPROJ).unwrap();
        Self {
            home: TempDir::new().unwrap(),
            root,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cmd(self.home.path());
        cmd.arg("-C").arg(self.root.path());
        cmd
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join(name)
    }

    fn write_push_event(&self, messages: &[&str]) -> std::path::PathBuf {
        let commits: Vec<_> = messages
            .iter()
            .map(|m| serde_json::json!({ "message": m }))
            .collect();
        let path = self.path("event.json");
        fs::write(&path, serde_json::json!({ "commits": commits }).to_string()).unwrap();
        path
    }

    fn manifest(&self) -> String {
        fs::read_to_string(self.path("App.csproj")).unwrap()
    }
}

fn json_stdout(output: &assert_cmd::assert::Assert) -> serde_json::Value {
    serde_json::from_slice(&output.get_output().stdout).expect("stdout should be valid JSON")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("bump"))
        .stdout(predicate::str::contains("current"));
}

#[test]
fn long_help_lists_environment() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GITHUB_OUTPUT"));
}

#[test]
fn version_flag_shows_version() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bump_help_lists_flags() {
    let home = TempDir::new().unwrap();
    cmd(home.path())
        .args(["bump", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--version-part"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--release-commit-message-regex"));
}

#[test]
fn missing_subcommand_fails() {
    let home = TempDir::new().unwrap();
    cmd(home.path()).assert().failure();
}

// =============================================================================
// Current Command
// =============================================================================

#[test]
fn current_prints_version() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["current", "--file", "App.csproj"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3"));
}

#[test]
fn current_json_reports_manifest() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["--json", "current", "--file", "App.csproj"])
        .assert()
        .success();
    let json = json_stdout(&output);
    assert_eq!(json["version"], "1.2.3");
    assert_eq!(json["manifest_type"], "csproj");
    assert_eq!(json["pre_release"], false);
}

#[test]
fn current_without_manifest_path_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("current")
        .assert()
        .failure()
        .stderr(predicate::str::contains("current version"));
}

// =============================================================================
// Bump Command
// =============================================================================

#[test]
fn explicit_part_dry_run_leaves_manifest_alone() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args([
            "--json",
            "bump",
            "--file",
            "App.csproj",
            "--version-part",
            "minor",
            "--dry-run",
        ])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["old_version"], "1.2.3");
    assert_eq!(json["new_version"], "1.3.0");
    assert_eq!(json["was_bumped"], true);
    assert_eq!(json["status"], "bumped");
    assert_eq!(json["dry_run"], true);
    assert_eq!(ws.manifest(), CSPROJ);
}

#[test]
fn push_event_commits_drive_the_bump() {
    let ws = Workspace::new();
    let event = ws.write_push_event(&["fix: typo", "feat: add export"]);

    let output = ws
        .cmd()
        .env("GITHUB_EVENT_PATH", &event)
        .args(["--json", "bump", "--file", "App.csproj", "--dry-run"])
        .assert()
        .success();

    assert_eq!(json_stdout(&output)["new_version"], "1.3.0");
}

#[test]
fn only_bump_commits_means_nothing_to_do() {
    let ws = Workspace::new();
    let event = ws.write_push_event(&["ci: version bump to 1.2.3"]);

    let output = ws
        .cmd()
        .env("GITHUB_EVENT_PATH", &event)
        .args(["--json", "bump", "--file", "App.csproj", "--dry-run"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["status"], "no-relevant-commits");
    assert_eq!(json["was_bumped"], false);
}

#[test]
fn unmatched_commits_leave_version_alone() {
    let ws = Workspace::new();
    let event = ws.write_push_event(&["docs: readme"]);

    ws.cmd()
        .env("GITHUB_EVENT_PATH", &event)
        .args(["bump", "--file", "App.csproj", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No action necessary"));
}

#[test]
fn skipping_every_git_step_still_writes_manifest() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "bump",
            "--file",
            "App.csproj",
            "--version-part",
            "major",
            "--skip-tag",
            "--skip-commit",
            "--skip-push",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.0.0"));

    assert!(ws.manifest().contains("<Version>2.0.0</Version>"));
}

#[test]
fn version_override_is_used_verbatim() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args([
            "--json",
            "bump",
            "--file",
            "App.csproj",
            "--version-override",
            "3.0.0-beta.1",
            "--dry-run",
        ])
        .assert()
        .success();

    assert_eq!(json_stdout(&output)["new_version"], "3.0.0-beta.1");
}

#[test]
fn writes_step_outputs() {
    let ws = Workspace::new();
    let output_file = ws.path("github_output");

    ws.cmd()
        .env("GITHUB_OUTPUT", &output_file)
        .args([
            "bump",
            "--file",
            "App.csproj",
            "--version-part",
            "patch",
            "--dry-run",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output_file).unwrap(),
        "oldVersion=1.2.3\nnewVersion=1.2.4\nwasBumped=true\n"
    );
}

#[test]
fn action_inputs_configure_the_run() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .env("INPUT_PATH-TO-FILE", "App.csproj")
        .env("INPUT_VERSION-PART", "prepatch")
        .env("INPUT_PRE-RELEASE-ID", "rc")
        .env("INPUT_DRY-RUN", "true")
        .args(["--json", "bump"])
        .assert()
        .success();

    assert_eq!(json_stdout(&output)["new_version"], "1.2.4-rc.0");
}

#[test]
fn flags_beat_action_inputs() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .env("INPUT_PATH-TO-FILE", "App.csproj")
        .env("INPUT_VERSION-PART", "major")
        .env("INPUT_DRY-RUN", "true")
        .args(["--json", "bump", "--version-part", "patch"])
        .assert()
        .success();

    assert_eq!(json_stdout(&output)["new_version"], "1.2.4");
}

#[test]
fn workspace_env_anchors_manifest_path() {
    let ws = Workspace::new();
    let elsewhere = TempDir::new().unwrap();

    let output = cmd(ws.home.path())
        .arg("-C")
        .arg(elsewhere.path())
        .env("GITHUB_WORKSPACE", ws.root.path())
        .args([
            "--json",
            "bump",
            "--file",
            "App.csproj",
            "--version-part",
            "patch",
            "--dry-run",
        ])
        .assert()
        .success();

    assert_eq!(json_stdout(&output)["old_version"], "1.2.3");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn invalid_action_bool_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .env("INPUT_DRY-RUN", "yes")
        .arg("bump")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dry-run"));
}

#[test]
fn unknown_manifest_type_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["bump", "--file", "App.csproj", "--type", "gradle", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gradle"));
}

#[test]
fn unknown_version_part_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["bump", "--file", "App.csproj", "--version-part", "huge", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("huge"));
}

#[test]
fn failures_are_annotated_under_actions() {
    let ws = Workspace::new();
    ws.cmd()
        .env("GITHUB_ACTIONS", "true")
        .args(["bump", "--file", "Missing.csproj", "--dry-run"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("::error::"));
}

//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CSPROJ: &str = "<Project>\n  <PropertyGroup>\n    <Version>0.4.1</Version>\n  </PropertyGroup>\n</Project>\n";

/// Returns a Command running our binary in `dir`, isolated from the host
/// environment.
#[allow(deprecated)]
fn cmd(home: &Path, dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    for var in [
        "GITHUB_WORKSPACE",
        "GITHUB_EVENT_PATH",
        "GITHUB_OUTPUT",
        "GITHUB_ACTIONS",
        "GITHUB_REF",
        "GITHUB_HEAD_REF",
        "INPUT_PATH-TO-FILE",
        "INPUT_TAG-PREFIX",
        "INPUT_VERSION-PART",
        "INPUT_DRY-RUN",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .arg("-C")
        .arg(dir);
    cmd
}

/// Run `bumpkin --json current` in `dir` and return the reported version.
fn current_version(home: &Path, dir: &Path) -> String {
    let output = cmd(home, dir)
        .args(["--json", "current"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    json["version"].as_str().unwrap().to_string()
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();

    cmd(home.path(), tmp.path())
        .args(["current", "--file", "App.csproj"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.1"));
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\n",
    )
    .unwrap();

    assert_eq!(current_version(home.path(), tmp.path()), "0.4.1");
}

#[test]
fn discovers_config_in_parent_directory() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(sub_dir.join("App.csproj"), CSPROJ).unwrap();

    // Config in root, run from nested/deep
    fs::write(
        tmp.path().join("bumpkin.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\n",
    )
    .unwrap();

    assert_eq!(current_version(home.path(), &sub_dir), "0.4.1");
}

#[test]
fn explicit_config_flag_is_loaded() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    let config = tmp.path().join("ci-bump.yaml");
    fs::write(&config, "bump:\n  manifest_path: App.csproj\n").unwrap();

    cmd(home.path(), tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.1"));
}

#[test]
fn user_config_is_loaded() {
    let home = TempDir::new().unwrap();
    let user_dir = home.path().join(".config").join("bumpkin");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(
        user_dir.join("config.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\n",
    )
    .unwrap();

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();

    assert_eq!(current_version(home.path(), tmp.path()), "0.4.1");
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_yaml_config() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.yaml"),
        "log_level: warn\nbump:\n  manifest_path: App.csproj\n",
    )
    .unwrap();

    assert_eq!(current_version(home.path(), tmp.path()), "0.4.1");
}

#[test]
fn parses_json_config() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.json"),
        r#"{"bump": {"manifest_path": "App.csproj"}}"#,
    )
    .unwrap();

    assert_eq!(current_version(home.path(), tmp.path()), "0.4.1");
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn config_settings_drive_the_bump() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.toml"),
        r#"
[bump]
manifest_path = "App.csproj"
version_part = "major"
dry_run = true
"#,
    )
    .unwrap();

    cmd(home.path(), tmp.path())
        .arg("bump")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"));

    assert_eq!(fs::read_to_string(tmp.path().join("App.csproj")).unwrap(), CSPROJ);
}

#[test]
fn action_input_beats_config_file() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\nversion_part = \"major\"\ndry_run = true\n",
    )
    .unwrap();

    cmd(home.path(), tmp.path())
        .env("INPUT_VERSION-PART", "patch")
        .arg("bump")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.2"));
}

#[test]
fn closer_config_takes_precedence() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(sub_dir.join("Child.csproj"), CSPROJ).unwrap();

    fs::write(
        tmp.path().join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"Parent.csproj\"\n",
    )
    .unwrap();
    fs::write(
        sub_dir.join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"Child.csproj\"\n",
    )
    .unwrap();

    assert_eq!(current_version(home.path(), &sub_dir), "0.4.1");
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".bumpkin.toml"), "this is not valid toml [[[").unwrap();

    cmd(home.path(), tmp.path())
        .arg("current")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn wrong_field_type_shows_error() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".bumpkin.toml"), "[bump]\ndry_run = \"sometimes\"\n").unwrap();

    cmd(home.path(), tmp.path())
        .arg("current")
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        tmp.path().join(".bumpkin.toml"),
        r#"
log_level = "info"
unknown_field = "should be ignored"

[bump]
manifest_path = "App.csproj"
another_unknown = 42
"#,
    )
    .unwrap();

    assert_eq!(current_version(home.path(), tmp.path()), "0.4.1");
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();

    // Structure: parent/.bumpkin.toml + parent/repo/.git/ + parent/repo/src/
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(src.join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        parent.join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\n",
    )
    .unwrap();

    // The parent config is outside the repo, so no manifest path is set
    cmd(home.path(), &src)
        .arg("current")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no manifest path"));
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let home = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(src.join("App.csproj"), CSPROJ).unwrap();
    fs::write(
        repo.join(".bumpkin.toml"),
        "[bump]\nmanifest_path = \"App.csproj\"\n",
    )
    .unwrap();

    assert_eq!(current_version(home.path(), &src), "0.4.1");
}

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `gavin` command isolated from any user manifest.
fn gavin(dir: &Path) -> Command {
    let manifest = dir.join("manifest.toml");
    if !manifest.exists() {
        fs::write(
            &manifest,
            "minimum_node_major = 18\n\n[blueprints]\nreact-app = \"acme/react-blueprint\"\n",
        )
        .unwrap();
    }

    let mut cmd = Command::cargo_bin("gavin").unwrap();
    cmd.current_dir(dir).env("GAVIN_MANIFEST", manifest);
    cmd
}

#[test]
fn no_command_prints_usage_and_fails() {
    let tmp = TempDir::new().unwrap();

    gavin(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: gavin [command] [options]"));
}

#[test]
fn help_succeeds() {
    let tmp = TempDir::new().unwrap();

    gavin(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi, I'm Gavin!"))
        .stdout(predicate::str::contains("Usage: gavin [command] [options]"));
}

#[test]
fn create_help_lists_react_app() {
    let tmp = TempDir::new().unwrap();

    gavin(tmp.path())
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Create a new React application"));
}

#[test]
fn version_prints_the_manifest_version() {
    let tmp = TempDir::new().unwrap();

    gavin(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_can_be_overridden_by_the_manifest() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("manifest.toml"),
        "version = \"4.2.0\"\nminimum_node_major = 18\n",
    )
    .unwrap();

    gavin(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("4.2.0"));
}

#[test]
fn missing_app_name_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();

    gavin(tmp.path())
        .args(["create", "react-app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required arguments were not provided"))
        .stderr(predicate::str::contains("<app-name>"));

    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
}

#[test]
fn malformed_manifest_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("manifest.toml"), "minimum_node_major = \"eighteen\"").unwrap();

    gavin(tmp.path())
        .arg("--version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse manifest"));
}

/// Puts a `node` that reports `version` first on the `PATH` of `cmd`.
#[cfg(unix)]
fn with_node(cmd: &mut Command, dir: &Path, version: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let node = bin.join("node");
    fs::write(&node, format!("#!/bin/sh\necho {version}\n")).unwrap();
    fs::set_permissions(&node, fs::Permissions::from_mode(0o755)).unwrap();

    let path = std::env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![bin];
    paths.extend(std::env::split_paths(&path));
    cmd.env("PATH", std::env::join_paths(paths).unwrap());
}

#[cfg(unix)]
#[test]
fn old_node_is_refused() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = gavin(tmp.path());
    with_node(&mut cmd, tmp.path(), "v16.0.0");

    cmd.args(["create", "react-app", "demo-app"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Command failed"))
        .stdout(predicate::str::contains(
            "Gavin formally requests you upgrade to Node 18+ (From v16)",
        ));

    assert!(!tmp.path().join("demo-app").exists());
}

#[cfg(unix)]
#[test]
fn existing_project_directory_is_left_alone() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("demo-app");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "mine").unwrap();

    let mut cmd = gavin(tmp.path());
    with_node(&mut cmd, tmp.path(), "v20.1.0");

    cmd.args(["create", "react-app", "demo-app"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unable to clone blueprint!"))
        .stdout(predicate::str::contains("target directory already exists"))
        .stdout(predicate::str::contains("Sorry, there was a problem creating the React app."))
        .stdout(predicate::str::contains("Partially created project").not());

    assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "mine");
}

#[cfg(unix)]
#[test]
fn absolute_app_name_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let outside = elsewhere.path().join("abs-app");

    gavin(tmp.path())
        .args(["create", "react-app"])
        .arg(&outside)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid app name"));

    assert!(!outside.exists());
}

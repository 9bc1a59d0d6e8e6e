//! CLI smoke tests for relpack.
//!
//! These tests verify that all subcommands parse, validate their inputs,
//! and return appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the relpack binary.
fn relpack_cmd() -> Command {
  cargo_bin_cmd!("relpack")
}

#[test]
fn help_flag_works() {
  relpack_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  relpack_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("relpack"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["job", "package", "release"] {
    relpack_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn release_requires_name() {
  relpack_cmd()
    .arg("release")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--name"));
}

#[test]
fn compiled_release_requires_stemcell() {
  let temp = TempDir::new().unwrap();

  relpack_cmd()
    .arg("release")
    .args(["--name", "rel"])
    .args(["--output", temp.path().join("rel.tgz").to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--stemcell-distro must be specified"));

  relpack_cmd()
    .arg("release")
    .args(["--name", "rel"])
    .args(["--stemcell-distro", "ubuntu-jammy"])
    .args(["--output", temp.path().join("rel.tgz").to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--stemcell-version must be specified"));
}

#[test]
fn uncompiled_release_skips_stemcell_validation() {
  let temp = TempDir::new().unwrap();

  relpack_cmd()
    .arg("release")
    .args(["--name", "rel", "--uncompiled"])
    .args(["--output", temp.path().join("rel.tgz").to_str().unwrap()])
    .assert()
    .success();
}

#[test]
fn missing_input_file_fails_with_path() {
  let temp = TempDir::new().unwrap();

  relpack_cmd()
    .arg("package")
    .args(["--output", temp.path().join("pkg.tgz").to_str().unwrap()])
    .args(["--file", "/nonexistent/payload"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("/nonexistent/payload"));
}

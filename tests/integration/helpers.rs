//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Matrix used by most tests: linux with a desktop entry, plain windows
pub const HOIST_TOML: &str = r#"[project]
bin = "launcher"

[application]
name = "Launcher"
description = "Starts the trading terminal"
icon = "assets/icon.png"

[[platforms]]
target = "x86_64-unknown-linux-gnu"
suffix = "linux"
binary = "launcher-linux"
icon = "launcher.png"

[[platforms]]
target = "x86_64-pc-windows-msvc"
suffix = "windows"
binary = "launcher-windows.exe"
"#;

/// A single-binary package in a git repository
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a package named `launcher` with one commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Cargo.toml"),
      r#"[package]
name = "launcher"
version = "0.1.0"
edition = "2021"

[dependencies]
"#,
    )?;
    std::fs::create_dir_all(path.join("src"))?;
    std::fs::write(path.join("src/main.rs"), "fn main() {}\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial package"])?;

    Ok(Self { _root: root, path })
  }

  /// Write hoist.toml plus the icon it references
  pub fn with_config(self, config: &str) -> Result<Self> {
    self.write_file("hoist.toml", config.as_bytes())?;
    self.write_file("assets/icon.png", b"\x89PNG fake icon")?;
    Ok(self)
  }

  pub fn write_file(&self, path: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, content)?;
    Ok(file_path)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run cargo-hoist and return its output whatever the exit status
pub fn run_cargo_hoist_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let cargo_hoist_bin = env!("CARGO_BIN_EXE_cargo-hoist");

  Command::new(cargo_hoist_bin)
    .current_dir(cwd)
    .arg("hoist")
    .args(args)
    .env("NO_COLOR", "1")
    .output()
    .context("Failed to run cargo-hoist")
}

/// Run cargo-hoist, failing on a non-zero exit status
pub fn run_cargo_hoist(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_cargo_hoist_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "cargo-hoist command failed: cargo hoist {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

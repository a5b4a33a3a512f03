//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_cargo_hoist(&workspace.path, &["init"])?;

  assert!(workspace.file_exists("hoist.toml"));
  let config = workspace.read_file("hoist.toml")?;
  assert!(config.contains("bin = \"launcher\""));
  assert!(config.contains("[[platforms]]"));
  assert!(config.contains("launcher-linux"));
  assert!(config.contains("launcher-windows.exe"));
  assert!(config.contains("launcher-macos"));

  // The written file must load back
  run_cargo_hoist(&workspace.path, &["plan"])?;

  Ok(())
}

#[test]
fn test_init_with_icon_enables_desktop_entry() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_cargo_hoist(&workspace.path, &["init", "--icon", "assets/icon.png"])?;

  let config = workspace.read_file("hoist.toml")?;
  assert!(config.contains("icon = \"launcher.png\""));

  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite_without_force() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  run_cargo_hoist(&workspace.path, &["init"])?;

  let output = run_cargo_hoist_raw(&workspace.path, &["init", "--bin", "other"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(workspace.read_file("hoist.toml")?.contains("bin = \"launcher\""));

  run_cargo_hoist(&workspace.path, &["init", "--bin", "other", "--force"])?;
  assert!(workspace.read_file("hoist.toml")?.contains("bin = \"other\""));

  Ok(())
}

#[test]
fn test_init_force_replaces_broken_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("hoist.toml", b"[project]\n")?;

  run_cargo_hoist(&workspace.path, &["init", "--force"])?;
  assert!(workspace.read_file("hoist.toml")?.contains("bin = \"launcher\""));

  Ok(())
}

#[test]
fn test_init_requires_a_package() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  git(temp.path(), &["init"])?;

  let output = run_cargo_hoist_raw(temp.path(), &["init"])?;
  assert!(!output.status.success());
  assert!(!temp.path().join("hoist.toml").exists());

  Ok(())
}

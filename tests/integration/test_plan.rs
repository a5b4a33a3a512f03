//! Tests for the `plan` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_plan_json_lists_jobs_and_assets() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;

  let output = run_cargo_hoist(&workspace.path, &["plan", "--format", "json"])?;
  let jobs: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  let jobs = jobs.as_array().expect("plan output is an array");

  assert_eq!(jobs.len(), 2);
  assert_eq!(jobs[0]["platform"], "linux");
  assert_eq!(jobs[0]["depends_on"], serde_json::json!(["release"]));
  assert_eq!(
    jobs[0]["assets"],
    serde_json::json!(["launcher-linux", "launcher-linux.desktop", "launcher.png"])
  );
  assert_eq!(jobs[1]["platform"], "windows");
  assert_eq!(jobs[1]["assets"], serde_json::json!(["launcher-windows.exe"]));

  Ok(())
}

#[test]
fn test_plan_dot_renders_graph() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;

  let output = run_cargo_hoist(&workspace.path, &["plan", "--format", "dot"])?;
  let dot = stdout(&output);
  assert!(dot.contains("digraph"));
  assert!(dot.contains("windows (x86_64-pc-windows-msvc)"));

  Ok(())
}

#[test]
fn test_plan_without_config_is_a_user_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_cargo_hoist_raw(&workspace.path, &["plan"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

#[test]
fn test_colliding_asset_names_are_rejected() -> Result<()> {
  let config = HOIST_TOML.replace("launcher-windows.exe", "launcher-linux");
  let workspace = TestWorkspace::new()?.with_config(&config)?;

  let output = run_cargo_hoist_raw(&workspace.path, &["plan"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

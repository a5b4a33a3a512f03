//! Tests for offline `next-tag`

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_next_tag_increments_minor() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_cargo_hoist(&workspace.path, &["next-tag", "--latest", "v0.7.0"])?;
  assert!(stdout(&output).starts_with("v0.8.0"));

  Ok(())
}

#[test]
fn test_next_tag_without_prior_release() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_cargo_hoist(&workspace.path, &["next-tag", "--no-prior", "--json"])?;
  let value: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(value["next"], "v0.1.0");
  assert_eq!(value["latest"], serde_json::Value::Null);
  assert_eq!(value["source"]["kind"], "no_prior_release");

  Ok(())
}

#[test]
fn test_unrecognized_tag_aborts_by_default() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_cargo_hoist_raw(&workspace.path, &["next-tag", "--latest", "v1.2.0"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stdout(&output).is_empty());

  Ok(())
}

#[test]
fn test_unrecognized_tag_falls_back_when_allowed() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_cargo_hoist(
    &workspace.path,
    &["next-tag", "--latest", "v1.2.0", "--allow-tag-fallback"],
  )?;
  assert!(stdout(&output).starts_with("v0.1.0"));

  let config = HOIST_TOML.replace("[application]", "[release]\nallow_tag_fallback = true\n\n[application]");
  let workspace = workspace.with_config(&config)?;
  let output = run_cargo_hoist(&workspace.path, &["next-tag", "--latest", "v1.2.0"])?;
  assert!(stdout(&output).starts_with("v0.1.0"));

  Ok(())
}

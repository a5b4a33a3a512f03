//! Tests for `package --binary` (no build, no uploads)

use crate::helpers::*;
use anyhow::Result;

fn package_json(workspace: &TestWorkspace, platform: &str, binary: &str) -> Result<serde_json::Value> {
  let output = run_cargo_hoist(&workspace.path, &["package", platform, "--binary", binary, "--json"])?;
  Ok(serde_json::from_str(&stdout(&output))?)
}

#[test]
fn test_package_linux_stages_launcher_files() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;
  workspace.write_file("prebuilt/launcher", b"linux binary")?;

  let bundle = package_json(&workspace, "linux", "prebuilt/launcher")?;
  let assets: Vec<&str> = bundle["files"]
    .as_array()
    .expect("files")
    .iter()
    .filter_map(|f| f["asset"].as_str())
    .collect();
  assert_eq!(assets, vec!["launcher-linux", "launcher-linux.desktop", "launcher.png"]);

  assert_eq!(workspace.read_file("target/hoist/linux/launcher-linux")?, "linux binary");
  let desktop = workspace.read_file("target/hoist/linux/launcher-linux.desktop")?;
  assert!(desktop.starts_with("[Desktop Entry]\n"));
  assert!(desktop.contains("Name=Launcher\n"));
  assert!(desktop.contains("Exec=launcher-linux\n"));
  assert!(desktop.contains("Icon=launcher\n"));
  assert!(desktop.contains("Categories=Utility;\n"));
  assert!(workspace.file_exists("target/hoist/linux/launcher.png"));

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(workspace.path.join("target/hoist/linux/launcher-linux"))?
      .permissions()
      .mode();
    assert_eq!(mode & 0o111, 0o111);
  }

  Ok(())
}

#[test]
fn test_package_windows_stages_binary_only() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;
  workspace.write_file("prebuilt/launcher.exe", b"windows binary")?;

  let bundle = package_json(&workspace, "windows", "prebuilt/launcher.exe")?;
  assert_eq!(bundle["files"].as_array().map(Vec::len), Some(1));
  assert!(workspace.file_exists("target/hoist/windows/launcher-windows.exe"));
  assert!(!workspace.file_exists("target/hoist/windows/launcher-windows.exe.desktop"));

  Ok(())
}

#[test]
fn test_repackaging_is_identical_and_isolated() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;
  workspace.write_file("prebuilt/launcher", b"linux binary")?;
  workspace.write_file("prebuilt/launcher.exe", b"windows binary")?;

  package_json(&workspace, "windows", "prebuilt/launcher.exe")?;
  let first = package_json(&workspace, "linux", "prebuilt/launcher")?;
  let second = package_json(&workspace, "linux", "prebuilt/launcher")?;

  assert_eq!(first["files"], second["files"]);
  assert!(workspace.file_exists("target/hoist/windows/launcher-windows.exe"));

  Ok(())
}

#[test]
fn test_package_unknown_platform_fails() -> Result<()> {
  let workspace = TestWorkspace::new()?.with_config(HOIST_TOML)?;
  workspace.write_file("prebuilt/launcher", b"binary")?;

  let output = run_cargo_hoist_raw(&workspace.path, &["package", "plan9", "--binary", "prebuilt/launcher"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

//! `cargo hoist init` - scaffold hoist.toml for the current package

use crate::core::config::{ApplicationConfig, HoistConfig, PlatformSpec, ProjectConfig, ReleasePolicy};
use crate::core::context::WorkspaceContext;
use crate::core::error::{HoistError, HoistResult};
use std::path::{Path, PathBuf};

/// Run the init command
pub fn run_init(ctx: &WorkspaceContext, bin: Option<String>, icon: Option<PathBuf>, force: bool) -> HoistResult<()> {
  let workspace_root = ctx.workspace_root();

  if HoistConfig::exists(workspace_root) && !force {
    return Err(HoistError::with_help(
      "Configuration already exists",
      "Pass --force to overwrite it",
    ));
  }

  let bin = match bin {
    Some(bin) => bin,
    None => discover_bin(workspace_root)?,
  };
  println!("📦 Binary target: {}", bin);

  let config = scaffold(&bin, icon);
  config.validate()?;
  config.save(workspace_root)?;

  println!("✅ Wrote {}", workspace_root.join("hoist.toml").display());
  println!();
  println!("Platform matrix:");
  for platform in &config.platforms {
    println!("  {:<10} {}", platform.platform_suffix, platform.target_id);
  }
  println!();
  println!("Next: `cargo hoist plan` to review the jobs and assets.");
  Ok(())
}

/// Default config: linux, windows and macos, launcher files on linux when an icon is given
fn scaffold(bin: &str, icon: Option<PathBuf>) -> HoistConfig {
  let linux_icon = icon.as_ref().map(|path| {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    format!("{}.{}", bin, extension)
  });

  HoistConfig {
    project: ProjectConfig {
      bin: bin.to_string(),
      repo: None,
      staging_dir: PathBuf::from("target").join("hoist"),
    },
    release: ReleasePolicy::default(),
    application: ApplicationConfig {
      name: Some(bin.to_string()),
      icon,
      ..Default::default()
    },
    platforms: vec![
      PlatformSpec {
        target_id: "x86_64-unknown-linux-gnu".to_string(),
        platform_suffix: "linux".to_string(),
        binary_name: format!("{}-linux", bin),
        icon_name: linux_icon,
      },
      PlatformSpec {
        target_id: "x86_64-pc-windows-msvc".to_string(),
        platform_suffix: "windows".to_string(),
        binary_name: format!("{}-windows.exe", bin),
        icon_name: None,
      },
      PlatformSpec {
        target_id: "aarch64-apple-darwin".to_string(),
        platform_suffix: "macos".to_string(),
        binary_name: format!("{}-macos", bin),
        icon_name: None,
      },
    ],
  }
}

/// First binary target of the root package
fn discover_bin(workspace_root: &Path) -> HoistResult<String> {
  let metadata = cargo_metadata::MetadataCommand::new()
    .current_dir(workspace_root)
    .no_deps()
    .exec()?;

  let package = metadata.root_package().ok_or_else(|| {
    HoistError::with_help(
      "No root package found (virtual workspace?)",
      "Pass --bin <name> to choose the binary to release",
    )
  })?;

  package
    .targets
    .iter()
    .find(|target| target.is_bin())
    .map(|target| target.name.clone())
    .ok_or_else(|| {
      HoistError::with_help(
        format!("Package '{}' has no binary target", package.name),
        "Pass --bin <name> to choose the binary to release",
      )
    })
}

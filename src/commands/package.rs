//! `cargo hoist package` - build and stage one platform locally (no uploads)

use crate::core::context::WorkspaceContext;
use crate::core::error::HoistResult;
use crate::matrix::{CargoToolchain, Packager, build_platform};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct PackageOutput {
  platform: String,
  dir: PathBuf,
  files: Vec<PackagedFile>,
}

#[derive(Debug, Serialize)]
struct PackagedFile {
  asset: String,
  path: PathBuf,
  sha256: String,
}

/// Run the package command; `binary` skips the build stage
pub fn run_package(ctx: &WorkspaceContext, platform: &str, binary: Option<PathBuf>, json: bool) -> HoistResult<()> {
  let config = ctx.require_config()?;
  let spec = config.platform(platform)?;
  let staging_root = ctx.staging_root()?;

  let binary = match binary {
    Some(path) => path,
    None => {
      if !json {
        println!("🔨 Building {} for {}...", config.project.bin, spec.target_id);
      }
      let toolchain = CargoToolchain::new(ctx.workspace_root(), &config.project.bin)?;
      build_platform(&toolchain, spec)?
    }
  };

  let packager = Packager::new(
    &staging_root,
    ctx.workspace_root(),
    &config.application,
    config.display_name(),
  );
  let bundle = packager.package(spec, &binary)?;

  if json {
    let output = PackageOutput {
      platform: bundle.platform.platform_suffix.clone(),
      dir: bundle.dir.clone(),
      files: bundle
        .files
        .iter()
        .map(|f| PackagedFile {
          asset: f.asset_name.clone(),
          path: f.local_path.clone(),
          sha256: f.sha256.clone(),
        })
        .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("📦 Staged {} in {}", spec.platform_suffix, bundle.dir.display());
  for file in &bundle.files {
    println!("   {:<32} sha256:{}", file.asset_name, &file.sha256[..12]);
  }
  Ok(())
}

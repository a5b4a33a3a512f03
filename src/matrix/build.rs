//! Platform build runner
//!
//! The compiler is an external collaborator behind [`BuildToolchain`]. The
//! default implementation runs `cargo build --release --target <triple>` and
//! finds the artifact in cargo's target directory.

use crate::core::config::PlatformSpec;
use crate::core::error::{BuildError, HoistError, HoistResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces a release-mode binary for a target triple
///
/// `Sync` because platform jobs build in parallel.
pub trait BuildToolchain: Sync {
  fn build(&self, target: &str) -> HoistResult<PathBuf>;
}

/// Toolchain backed by `cargo build`
pub struct CargoToolchain {
  workspace_root: PathBuf,
  bin: String,
  target_dir: PathBuf,
}

impl CargoToolchain {
  /// Resolve cargo's target directory for the workspace once
  pub fn new(workspace_root: &Path, bin: &str) -> HoistResult<Self> {
    let metadata = cargo_metadata::MetadataCommand::new()
      .current_dir(workspace_root)
      .no_deps()
      .exec()?;

    Ok(Self {
      workspace_root: workspace_root.to_path_buf(),
      bin: bin.to_string(),
      target_dir: metadata.target_directory.as_std_path().to_path_buf(),
    })
  }

  /// `<target_dir>/<triple>/release/<bin>[.exe]`
  pub fn artifact_path(&self, target: &str) -> PathBuf {
    artifact_path(&self.target_dir, target, &self.bin)
  }
}

impl BuildToolchain for CargoToolchain {
  fn build(&self, target: &str) -> HoistResult<PathBuf> {
    let mut cmd = Command::new("cargo");
    cmd
      .current_dir(&self.workspace_root)
      .args(["build", "--release", "--target", target, "--bin", self.bin.as_str()]);

    log::info!("cargo build --release --target {} --bin {}", target, self.bin);
    let output = cmd.output().map_err(|e| {
      HoistError::Build(BuildError::ToolchainFailed {
        target: target.to_string(),
        reason: format!("Failed to execute cargo: {}", e),
      })
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(HoistError::Build(BuildError::ToolchainFailed {
        target: target.to_string(),
        reason: tail(&stderr, 20),
      }));
    }

    let artifact = self.artifact_path(target);
    if !artifact.is_file() {
      return Err(HoistError::Build(BuildError::ArtifactMissing {
        target: target.to_string(),
        path: artifact,
      }));
    }
    Ok(artifact)
  }
}

fn artifact_path(target_dir: &Path, target: &str, bin: &str) -> PathBuf {
  let file_name = if target.contains("windows") {
    format!("{}.exe", bin)
  } else {
    bin.to_string()
  };
  target_dir.join(target).join("release").join(file_name)
}

/// Last `n` lines of compiler output
fn tail(text: &str, n: usize) -> String {
  let lines: Vec<&str> = text.trim_end().lines().collect();
  lines[lines.len().saturating_sub(n)..].join("\n")
}

/// Run the build stage for one platform
pub fn build_platform(toolchain: &dyn BuildToolchain, spec: &PlatformSpec) -> HoistResult<PathBuf> {
  log::debug!("building {} for {}", spec.platform_suffix, spec.target_id);
  toolchain.build(&spec.target_id).map_err(|err| match err {
    HoistError::Build(_) => err,
    other => HoistError::Build(BuildError::ToolchainFailed {
      target: spec.target_id.clone(),
      reason: other.to_string(),
    }),
  })
}

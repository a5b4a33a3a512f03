//! Asset packager
//!
//! Assembles `<staging_root>/<suffix>/` for one platform:
//!
//! - the built binary, renamed to the platform's binary asset name
//! - when the platform sets an icon: the icon file and a desktop-entry
//!   descriptor `<binary>.desktop`
//!
//! Packaging is local-only. It clears and refills the platform's own
//! directory and never writes anywhere else, so repeating it with the same
//! inputs gives the same bundle.

use crate::core::config::{ApplicationConfig, PlatformSpec};
use crate::core::error::{BuildError, HoistError, HoistResult};
use crate::release::state::StagedAsset;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A file ready to upload; the file name equals the asset name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
  pub local_path: PathBuf,
  pub asset_name: String,
  pub sha256: String,
}

/// Staged files for one platform, sorted by asset name
#[derive(Debug, Clone)]
pub struct StagingBundle {
  pub platform: PlatformSpec,
  pub dir: PathBuf,
  pub files: Vec<StagedFile>,
}

impl StagingBundle {
  pub fn asset_names(&self) -> Vec<&str> {
    self.files.iter().map(|f| f.asset_name.as_str()).collect()
  }

  pub fn staged_assets(&self) -> Vec<StagedAsset> {
    self
      .files
      .iter()
      .map(|f| StagedAsset {
        name: f.asset_name.clone(),
        sha256: f.sha256.clone(),
      })
      .collect()
  }
}

/// Builds staging bundles under one staging root
pub struct Packager<'a> {
  staging_root: &'a Path,
  /// Icon paths in the application config are relative to this
  workspace_root: &'a Path,
  application: &'a ApplicationConfig,
  display_name: &'a str,
}

impl<'a> Packager<'a> {
  pub fn new(
    staging_root: &'a Path,
    workspace_root: &'a Path,
    application: &'a ApplicationConfig,
    display_name: &'a str,
  ) -> Self {
    Self {
      staging_root,
      workspace_root,
      application,
      display_name,
    }
  }

  /// Directory a platform's bundle is staged in
  pub fn platform_dir(&self, spec: &PlatformSpec) -> HoistResult<PathBuf> {
    if !is_plain_name(&spec.platform_suffix) {
      return Err(packaging_failed(
        spec,
        format!("suffix '{}' is not a plain directory name", spec.platform_suffix),
      ));
    }
    Ok(self.staging_root.join(&spec.platform_suffix))
  }

  /// Stage `binary` (and launcher files when configured) for `spec`
  pub fn package(&self, spec: &PlatformSpec, binary: &Path) -> HoistResult<StagingBundle> {
    let dir = self.platform_dir(spec)?;
    if !binary.is_file() {
      return Err(packaging_failed(spec, format!("binary {} does not exist", binary.display())));
    }

    if dir.exists() {
      fs::remove_dir_all(&dir).map_err(|e| packaging_failed(spec, format!("failed to clear {}: {}", dir.display(), e)))?;
    }
    fs::create_dir_all(&dir).map_err(|e| packaging_failed(spec, format!("failed to create {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();

    let staged_binary = dir.join(&spec.binary_name);
    fs::copy(binary, &staged_binary).map_err(|e| packaging_failed(spec, format!("failed to stage binary: {}", e)))?;
    make_executable(&staged_binary).map_err(|e| packaging_failed(spec, format!("failed to mark executable: {}", e)))?;
    files.push(stage_file(spec, staged_binary, &spec.binary_name)?);

    if let (Some(icon_name), Some(descriptor_name)) = (&spec.icon_name, spec.descriptor_name()) {
      let source = self.application.icon.as_ref().ok_or_else(|| {
        packaging_failed(spec, "platform sets an icon but [application].icon is not configured".to_string())
      })?;
      let source = self.workspace_root.join(source);
      let staged_icon = dir.join(icon_name);
      fs::copy(&source, &staged_icon)
        .map_err(|e| packaging_failed(spec, format!("failed to stage icon {}: {}", source.display(), e)))?;
      files.push(stage_file(spec, staged_icon, icon_name)?);

      let staged_descriptor = dir.join(&descriptor_name);
      fs::write(&staged_descriptor, desktop_entry(spec, self.application, self.display_name))
        .map_err(|e| packaging_failed(spec, format!("failed to write descriptor: {}", e)))?;
      files.push(stage_file(spec, staged_descriptor, &descriptor_name)?);
    }

    files.sort_by(|a, b| a.asset_name.cmp(&b.asset_name));
    log::debug!("staged {} file(s) for {} in {}", files.len(), spec.platform_suffix, dir.display());

    Ok(StagingBundle {
      platform: spec.clone(),
      dir,
      files,
    })
  }
}

/// Desktop-entry descriptor for a platform that ships an icon
pub fn desktop_entry(spec: &PlatformSpec, application: &ApplicationConfig, display_name: &str) -> String {
  // Icon keys take a theme name (no extension) or an absolute path
  let icon = spec
    .icon_name
    .as_deref()
    .map(|name| Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name))
    .unwrap_or_default();
  let mut entry = String::from("[Desktop Entry]\n");
  for (key, value) in [
    ("Version", "1.0".to_string()),
    ("Type", "Application".to_string()),
    ("Name", escape_value(display_name)),
    ("Comment", escape_value(&application.description)),
    ("Exec", exec_command(&spec.binary_name)),
    ("Icon", escape_value(icon)),
    ("Terminal", application.terminal.to_string()),
    ("Categories", escape_value(&application.categories)),
  ] {
    entry.push_str(key);
    entry.push('=');
    entry.push_str(&value);
    entry.push('\n');
  }
  entry
}

/// Escape a desktop-entry string value (backslash, newline, tab, carriage return)
fn escape_value(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\t' => out.push_str("\\t"),
      '\r' => out.push_str("\\r"),
      c => out.push(c),
    }
  }
  out
}

/// `Exec` value; quoted when the binary name contains reserved characters.
/// A literal `%` is doubled so it is not read as a field code.
fn exec_command(binary: &str) -> String {
  let reserved = |c: char| c.is_whitespace() || "\"'\\><~|&;$*?#()`".contains(c);
  let command = if binary.chars().any(reserved) {
    let quoted = binary
      .replace('\\', "\\\\\\\\")
      .replace('"', "\\\\\"")
      .replace('`', "\\\\`")
      .replace('$', "\\\\$");
    format!("\"{}\"", quoted)
  } else {
    binary.to_string()
  };
  command.replace('%', "%%")
}

fn stage_file(spec: &PlatformSpec, path: PathBuf, asset_name: &str) -> HoistResult<StagedFile> {
  let bytes = fs::read(&path).map_err(|e| packaging_failed(spec, format!("failed to read {}: {}", path.display(), e)))?;
  Ok(StagedFile {
    local_path: path,
    asset_name: asset_name.to_string(),
    sha256: format!("{:x}", Sha256::digest(&bytes)),
  })
}

fn is_plain_name(name: &str) -> bool {
  let mut components = Path::new(name).components();
  matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}

fn packaging_failed(spec: &PlatformSpec, reason: String) -> HoistError {
  HoistError::Build(BuildError::PackagingFailed {
    platform: spec.platform_suffix.clone(),
    reason,
  })
}

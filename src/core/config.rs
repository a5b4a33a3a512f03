use crate::core::error::{ConfigError, HoistError, HoistResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for cargo-hoist
/// Searched in order: hoist.toml, .hoist.toml, .cargo/hoist.toml, .config/hoist.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoistConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub release: ReleasePolicy,
  #[serde(default)]
  pub application: ApplicationConfig,
  #[serde(default)]
  pub platforms: Vec<PlatformSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Cargo binary target to build
  pub bin: String,

  /// Release repository (`owner/name`); defaults to the repo `gh` infers from the checkout
  #[serde(default)]
  pub repo: Option<String>,

  /// Root of the per-platform staging directories, relative to the workspace root
  #[serde(default = "default_staging_dir")]
  pub staging_dir: PathBuf,
}

fn default_staging_dir() -> PathBuf {
  PathBuf::from("target").join("hoist")
}

/// How releases are named and how the next tag is chosen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePolicy {
  /// Restart at v0.1.0 when the latest tag is outside the v0.<minor>.0 scheme
  #[serde(default)]
  pub allow_tag_fallback: bool,

  /// Release title; `{tag}` and `{commit}` are substituted
  #[serde(default = "default_title")]
  pub title: String,

  /// Release notes; `{tag}` and `{commit}` are substituted
  #[serde(default = "default_notes")]
  pub notes: String,
}

fn default_title() -> String {
  "Release {tag}".to_string()
}

fn default_notes() -> String {
  "Automated release built from commit {commit}.".to_string()
}

impl Default for ReleasePolicy {
  fn default() -> Self {
    Self {
      allow_tag_fallback: false,
      title: default_title(),
      notes: default_notes(),
    }
  }
}

impl ReleasePolicy {
  pub fn render_title(&self, tag: &str, commit: &str) -> String {
    render_template(&self.title, tag, commit)
  }

  pub fn render_notes(&self, tag: &str, commit: &str) -> String {
    render_template(&self.notes, tag, commit)
  }

  /// Reject templates with placeholders other than `{tag}` and `{commit}`
  pub fn validate(&self) -> HoistResult<()> {
    for (field, template) in [("title", &self.title), ("notes", &self.notes)] {
      let stripped = template.replace("{tag}", "").replace("{commit}", "");
      if stripped.contains('{') || stripped.contains('}') {
        return Err(HoistError::Config(ConfigError::Invalid {
          reason: format!(
            "release.{} '{}' may only use the {{tag}} and {{commit}} placeholders",
            field, template
          ),
        }));
      }
    }
    Ok(())
  }
}

fn render_template(template: &str, tag: &str, commit: &str) -> String {
  template.replace("{tag}", tag).replace("{commit}", commit)
}

/// Launcher metadata used for desktop-entry descriptors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
  /// Display name; defaults to `[project].bin`
  #[serde(default)]
  pub name: Option<String>,

  #[serde(default)]
  pub description: String,

  /// Source icon file, relative to the workspace root
  #[serde(default)]
  pub icon: Option<PathBuf>,

  #[serde(default = "default_categories")]
  pub categories: String,

  /// Run in a foreground terminal
  #[serde(default)]
  pub terminal: bool,
}

fn default_categories() -> String {
  "Utility;".to_string()
}

impl Default for ApplicationConfig {
  fn default() -> Self {
    Self {
      name: None,
      description: String::new(),
      icon: None,
      categories: default_categories(),
      terminal: false,
    }
  }
}

/// One entry of the platform matrix
///
/// ```toml
/// [[platforms]]
/// target = "x86_64-unknown-linux-gnu"
/// suffix = "linux"
/// binary = "launcher-linux"
/// icon = "launcher.png"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
  /// Toolchain target triple
  #[serde(rename = "target")]
  pub target_id: String,

  /// Short platform name; also the staging subdirectory
  #[serde(rename = "suffix")]
  pub platform_suffix: String,

  /// Asset name of the binary on the release
  #[serde(rename = "binary")]
  pub binary_name: String,

  /// Asset name of the icon; enables the desktop-entry descriptor
  #[serde(rename = "icon", default, skip_serializing_if = "Option::is_none")]
  pub icon_name: Option<String>,
}

impl PlatformSpec {
  /// Asset name of the synthesized desktop-entry descriptor
  pub fn descriptor_name(&self) -> Option<String> {
    self.icon_name.as_ref().map(|_| format!("{}.desktop", self.binary_name))
  }

  /// Every asset this platform attaches to a release
  pub fn expected_assets(&self) -> Vec<String> {
    let mut assets = vec![self.binary_name.clone()];
    if let (Some(descriptor), Some(icon)) = (self.descriptor_name(), &self.icon_name) {
      assets.push(descriptor);
      assets.push(icon.clone());
    }
    assets
  }
}

impl HoistConfig {
  /// Find config file in search order: hoist.toml, .hoist.toml, .cargo/hoist.toml, .config/hoist.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("hoist.toml"),
      path.join(".hoist.toml"),
      path.join(".cargo").join("hoist.toml"),
      path.join(".config").join("hoist.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from hoist.toml (searches multiple locations)
  pub fn load(path: &Path) -> HoistResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      HoistError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    log::debug!(
      "loaded {} with {} platform(s)",
      config_path.display(),
      config.platforms.len()
    );
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> HoistResult<Self> {
    let config: HoistConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Save config to hoist.toml (default location)
  pub fn save(&self, path: &Path) -> HoistResult<()> {
    let config_path = path.join("hoist.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Display name used in launcher descriptors
  pub fn display_name(&self) -> &str {
    self.application.name.as_deref().unwrap_or(&self.project.bin)
  }

  /// Look up a platform by suffix
  pub fn platform(&self, suffix: &str) -> HoistResult<&PlatformSpec> {
    self
      .platforms
      .iter()
      .find(|p| p.platform_suffix == suffix)
      .ok_or_else(|| {
        HoistError::Config(ConfigError::PlatformNotFound {
          suffix: suffix.to_string(),
        })
      })
  }

  /// Validate the matrix and templates
  pub fn validate(&self) -> HoistResult<()> {
    if self.project.bin.trim().is_empty() {
      return Err(HoistError::Config(ConfigError::MissingField {
        field: "project.bin".to_string(),
      }));
    }

    if self.platforms.is_empty() {
      return Err(HoistError::with_help(
        "The platform matrix is empty",
        "Add at least one [[platforms]] entry to hoist.toml",
      ));
    }

    let mut suffixes = HashSet::new();
    let mut assets = HashSet::new();
    for platform in &self.platforms {
      for (field, value) in [
        ("target", &platform.target_id),
        ("suffix", &platform.platform_suffix),
        ("binary", &platform.binary_name),
      ] {
        if value.trim().is_empty() {
          return Err(HoistError::Config(ConfigError::MissingField {
            field: format!("platforms.{}", field),
          }));
        }
      }

      if !suffixes.insert(platform.platform_suffix.as_str()) {
        return Err(HoistError::Config(ConfigError::Invalid {
          reason: format!("platform suffix '{}' is used more than once", platform.platform_suffix),
        }));
      }

      // Assets share one namespace per release; a clash would clobber across platforms
      for asset in platform.expected_assets() {
        if asset.contains('/') || asset.contains('\\') {
          return Err(HoistError::Config(ConfigError::Invalid {
            reason: format!("asset name '{}' must not contain path separators", asset),
          }));
        }
        if !assets.insert(asset.clone()) {
          return Err(HoistError::Config(ConfigError::Invalid {
            reason: format!(
              "asset name '{}' (platform '{}') collides with another platform's asset",
              asset, platform.platform_suffix
            ),
          }));
        }
      }

      if platform.icon_name.is_some() && self.application.icon.is_none() {
        return Err(HoistError::Config(ConfigError::MissingField {
          field: format!(
            "application.icon (required by platform '{}' which sets an icon)",
            platform.platform_suffix
          ),
        }));
      }
    }

    self.release.validate()
  }
}

//! Workspace context - load config once, pass everywhere
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/run.rs, package.rs, etc:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```

use crate::core::config::HoistConfig;
use crate::core::error::{ConfigError, HoistError, HoistResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared workspace-level data, built once at startup.
#[derive(Clone)]
pub struct WorkspaceContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Hoist configuration (hoist.toml)
  /// Optional because `init` runs before it exists
  pub config: Option<Arc<HoistConfig>>,
}

impl WorkspaceContext {
  /// Build workspace context from a root directory.
  ///
  /// A missing hoist.toml is not an error here; a present but invalid one is.
  pub fn build(workspace_root: &Path) -> HoistResult<Self> {
    let root = workspace_root.to_path_buf();
    let config = if HoistConfig::exists(&root) {
      Some(Arc::new(HoistConfig::load(&root)?))
    } else {
      None
    };

    Ok(Self { root, config })
  }

  /// Build a context around an in-memory config
  #[cfg(test)]
  pub fn with_config(root: &Path, config: HoistConfig) -> Self {
    Self {
      root: root.to_path_buf(),
      config: Some(Arc::new(config)),
    }
  }

  /// Get workspace root
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }

  /// Get config, or a NotFound error for commands that need it
  pub fn require_config(&self) -> HoistResult<&HoistConfig> {
    self.config.as_deref().ok_or_else(|| {
      HoistError::Config(ConfigError::NotFound {
        workspace_root: self.root.clone(),
      })
    })
  }

  /// Absolute root of the per-platform staging directories
  pub fn staging_root(&self) -> HoistResult<PathBuf> {
    Ok(self.root.join(&self.require_config()?.project.staging_dir))
  }
}

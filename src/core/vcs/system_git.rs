//! System git backend
//!
//! Only used to resolve the commit a release is cut from. Runs git with an
//! isolated environment so user config cannot change its output.

use crate::core::error::{HoistError, HoistResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> HoistResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(HoistError::with_help(
          format!("Not a git repository: {}", path.display()),
          "Pass --commit <sha> explicitly or run inside the release checkout",
        ));
      }
      return Err(HoistError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Resolve a revision (branch, tag, short SHA, `HEAD`) to a full commit SHA
  pub fn resolve_commit(&self, rev: &str) -> HoistResult<String> {
    let spec = format!("{}^{{commit}}", rev);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &spec])
      .output()
      .with_context(|| format!("Failed to resolve revision '{}'", rev))?;

    if !output.status.success() {
      return Err(HoistError::message(format!("Unknown revision: {}", rev)));
    }

    let sha = String::from_utf8(output.stdout)?.trim().to_string();
    if !is_valid_sha(&sha) {
      return Err(HoistError::message(format!(
        "git rev-parse returned an unexpected value for '{}': {}",
        rev, sha
      )));
    }
    Ok(sha)
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> HoistResult<String> {
    self.resolve_commit("HEAD")
  }

  /// Create a git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd
  }
}

/// Validate SHA format (40 hex chars, or 64 for sha256 repositories)
pub fn is_valid_sha(sha: &str) -> bool {
  (sha.len() == 40 || sha.len() == 64) && sha.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_is_valid_sha() {
    assert!(is_valid_sha("a".repeat(40).as_str()));
    assert!(is_valid_sha("0".repeat(64).as_str()));
    assert!(!is_valid_sha("z".repeat(40).as_str()));
    assert!(!is_valid_sha("a".repeat(39).as_str()));
  }
}

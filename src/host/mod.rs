//! Hosting platform release API
//!
//! The orchestrator only talks to the hosting platform through [`ReleaseHost`].
//! The production implementation shells out to the GitHub CLI; tests use an
//! in-memory host.
//!
//! Implementations report raw failures; the resolver, publisher and uploader
//! wrap them into stage-specific [`HostError`](crate::core::error::HostError)s.

pub mod gh;
#[cfg(test)]
pub mod memory;

use crate::core::error::HoistResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use gh::GhCli;

/// A release as reported by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
  pub tag: String,
  pub title: String,
  pub notes: String,
  pub draft: bool,
  pub prerelease: bool,
  /// Commit the release tag points at, when the host reports it
  #[serde(default)]
  pub target_commit: Option<String>,
  /// Names of attached assets
  #[serde(default)]
  pub assets: Vec<String>,
}

/// Parameters for creating a release; always published, never draft or prerelease
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
  pub tag: String,
  pub title: String,
  pub notes: String,
  pub target_commit: String,
}

/// An uploaded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
  pub tag: String,
  pub name: String,
}

/// Release operations consumed from the hosting platform
///
/// `Sync` because platform jobs share one host across threads.
pub trait ReleaseHost: Sync {
  /// Latest published release, or `None` when the repository has none
  fn latest_release(&self) -> HoistResult<Option<Release>>;

  /// Release for a specific tag, or `None` when the tag is unclaimed
  fn find_release(&self, tag: &str) -> HoistResult<Option<Release>>;

  /// Create a published release
  fn create_release(&self, release: &NewRelease) -> HoistResult<Release>;

  /// Upload a file as an asset named after its file name.
  /// With `clobber`, an existing same-named asset is replaced.
  fn upload_asset(&self, tag: &str, path: &Path, clobber: bool) -> HoistResult<AssetRef>;

  /// Names of the assets currently attached to a release
  fn list_assets(&self, tag: &str) -> HoistResult<Vec<String>>;
}

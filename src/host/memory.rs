//! In-memory release host for tests
//!
//! Models assets with last-writer-wins content and lets tests inject
//! failures for queries, creation and individual uploads.

use crate::core::error::{HoistError, HoistResult};
use crate::host::{AssetRef, NewRelease, Release, ReleaseHost};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
struct State {
  /// Releases in creation order
  releases: Vec<Release>,
  /// (tag, asset name) -> content
  contents: BTreeMap<(String, String), Vec<u8>>,
  create_calls: usize,
  upload_calls: usize,
}

#[derive(Default)]
pub struct MemoryHost {
  state: Mutex<State>,
  pub fail_query: Option<String>,
  pub fail_create: Option<String>,
  pub fail_uploads: HashSet<String>,
  pub fail_list: Option<String>,
}

impl MemoryHost {
  pub fn new() -> Self {
    Self::default()
  }

  /// Host whose release queries (latest and by tag) fail
  pub fn failing_query(reason: &str) -> Self {
    Self {
      fail_query: Some(reason.to_string()),
      ..Self::default()
    }
  }

  /// Host that rejects release creation
  pub fn failing_create(reason: &str) -> Self {
    Self {
      fail_create: Some(reason.to_string()),
      ..Self::default()
    }
  }

  /// Host whose asset listing fails
  pub fn failing_list(reason: &str) -> Self {
    Self {
      fail_list: Some(reason.to_string()),
      ..Self::default()
    }
  }

  /// Host whose latest release has `tag`
  pub fn with_release(tag: &str, target_commit: Option<&str>) -> Self {
    let host = Self::new();
    host.seed(tag, target_commit);
    host
  }

  pub fn seed(&self, tag: &str, target_commit: Option<&str>) {
    self.lock().releases.push(Release {
      tag: tag.to_string(),
      title: format!("Release {}", tag),
      notes: String::new(),
      draft: false,
      prerelease: false,
      target_commit: target_commit.map(str::to_string),
      assets: Vec::new(),
    });
  }

  pub fn releases(&self) -> Vec<Release> {
    self.lock().releases.clone()
  }

  pub fn create_calls(&self) -> usize {
    self.lock().create_calls
  }

  pub fn upload_calls(&self) -> usize {
    self.lock().upload_calls
  }

  pub fn content(&self, tag: &str, asset: &str) -> Option<Vec<u8>> {
    self.lock().contents.get(&(tag.to_string(), asset.to_string())).cloned()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl ReleaseHost for MemoryHost {
  fn latest_release(&self) -> HoistResult<Option<Release>> {
    if let Some(reason) = &self.fail_query {
      return Err(HoistError::message(reason.clone()));
    }
    Ok(
      self
        .lock()
        .releases
        .iter()
        .rev()
        .find(|r| !r.draft && !r.prerelease)
        .cloned(),
    )
  }

  fn find_release(&self, tag: &str) -> HoistResult<Option<Release>> {
    if let Some(reason) = &self.fail_query {
      return Err(HoistError::message(reason.clone()));
    }
    Ok(self.lock().releases.iter().find(|r| r.tag == tag).cloned())
  }

  fn create_release(&self, release: &NewRelease) -> HoistResult<Release> {
    let mut state = self.lock();
    state.create_calls += 1;
    if let Some(reason) = &self.fail_create {
      return Err(HoistError::message(reason.clone()));
    }
    if state.releases.iter().any(|r| r.tag == release.tag) {
      return Err(HoistError::message(format!("a release with tag {} already exists", release.tag)));
    }
    let created = Release {
      tag: release.tag.clone(),
      title: release.title.clone(),
      notes: release.notes.clone(),
      draft: false,
      prerelease: false,
      target_commit: Some(release.target_commit.clone()),
      assets: Vec::new(),
    };
    state.releases.push(created.clone());
    Ok(created)
  }

  fn upload_asset(&self, tag: &str, path: &Path, clobber: bool) -> HoistResult<AssetRef> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| HoistError::message("asset path has no file name"))?;
    let content = std::fs::read(path)?;

    let mut state = self.lock();
    state.upload_calls += 1;
    if self.fail_uploads.contains(&name) {
      return Err(HoistError::message(format!("HTTP 502 uploading {}", name)));
    }

    let release = state
      .releases
      .iter_mut()
      .find(|r| r.tag == tag)
      .ok_or_else(|| HoistError::message(format!("release {} not found", tag)))?;
    if release.assets.contains(&name) {
      if !clobber {
        return Err(HoistError::message(format!("asset {} already exists", name)));
      }
    } else {
      release.assets.push(name.clone());
    }
    state.contents.insert((tag.to_string(), name.clone()), content);

    Ok(AssetRef {
      tag: tag.to_string(),
      name,
    })
  }

  fn list_assets(&self, tag: &str) -> HoistResult<Vec<String>> {
    if let Some(reason) = &self.fail_list {
      return Err(HoistError::message(reason.clone()));
    }
    self
      .lock()
      .releases
      .iter()
      .find(|r| r.tag == tag)
      .map(|r| r.assets.clone())
      .ok_or_else(|| HoistError::message(format!("release {} not found", tag)))
  }
}

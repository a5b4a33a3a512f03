//! Release lifecycle and the per-run record
//!
//! ```text
//! Unpublished --publish--> Published --verify--> AssetsComplete
//!                                          \---> PublishedIncomplete { missing }
//! ```

use crate::core::error::HoistResult;
use crate::core::error::ResultExt;
use crate::release::tag::TagSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Event that triggered the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RunEvent {
  /// Push to the release branch: publish and upload
  Publish,
  /// Pre-merge validation: build and package only
  PreMerge,
}

impl RunEvent {
  pub fn uploads_assets(self) -> bool {
    matches!(self, RunEvent::Publish)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReleaseState {
  Unpublished,
  Published,
  AssetsComplete,
  PublishedIncomplete { missing: Vec<String> },
}

impl ReleaseState {
  /// Unpublished -> Published; any other state is left as is
  pub fn publish(self) -> Self {
    match self {
      ReleaseState::Unpublished => ReleaseState::Published,
      other => other,
    }
  }

  /// Compare the assets on the release with the expected set.
  /// Only a published release can be verified.
  pub fn verify<'a>(self, expected: impl IntoIterator<Item = &'a str>, actual: &[String]) -> Self {
    if self == ReleaseState::Unpublished {
      return self;
    }
    let actual: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
    let missing: Vec<String> = expected
      .into_iter()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .filter(|name| !actual.contains(name))
      .map(str::to_string)
      .collect();

    if missing.is_empty() {
      ReleaseState::AssetsComplete
    } else {
      ReleaseState::PublishedIncomplete { missing }
    }
  }

  pub fn is_incomplete(&self) -> bool {
    matches!(self, ReleaseState::PublishedIncomplete { .. })
  }
}

/// Stage of a platform job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Build,
  Package,
  Upload,
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Stage::Build => write!(f, "build"),
      Stage::Package => write!(f, "package"),
      Stage::Upload => write!(f, "upload"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
  Succeeded,
  Failed { stage: Stage, reason: String },
}

/// A file staged for upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedAsset {
  pub name: String,
  pub sha256: String,
}

/// Result of one platform job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOutcome {
  pub platform: String,
  pub target: String,
  pub status: JobStatus,
  #[serde(default)]
  pub staged: Vec<StagedAsset>,
  #[serde(default)]
  pub uploaded: Vec<String>,
}

impl PlatformOutcome {
  pub fn failure_line(&self) -> Option<String> {
    match &self.status {
      JobStatus::Succeeded => None,
      JobStatus::Failed { stage, reason } => Some(format!("{}: {}: {}", self.platform, stage, reason)),
    }
  }
}

/// Everything a run observed and did, written next to the staging bundles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
  pub run_id: String,
  pub event: RunEvent,
  pub commit: String,
  pub started_at: DateTime<Utc>,
  #[serde(default)]
  pub finished_at: Option<DateTime<Utc>>,
  /// Latest release tag seen before anything was written
  #[serde(default)]
  pub observed_latest: Option<String>,
  #[serde(default)]
  pub tag: Option<String>,
  #[serde(default)]
  pub tag_source: Option<TagSource>,
  #[serde(default)]
  pub release_created: bool,
  pub state: ReleaseState,
  /// Why the published release could not be checked, if it could not
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verify_error: Option<String>,
  #[serde(default)]
  pub platforms: Vec<PlatformOutcome>,
}

impl RunRecord {
  pub const FILE_NAME: &'static str = "run-record.json";
  /// Pre-merge runs keep their own record so they never shadow a release
  pub const PRE_MERGE_FILE_NAME: &'static str = "run-record.pre-merge.json";

  pub fn new(event: RunEvent, commit: &str) -> Self {
    Self {
      run_id: run_id(event, commit),
      event,
      commit: commit.to_string(),
      started_at: Utc::now(),
      finished_at: None,
      observed_latest: None,
      tag: None,
      tag_source: None,
      release_created: false,
      state: ReleaseState::Unpublished,
      verify_error: None,
      platforms: Vec::new(),
    }
  }

  pub fn finish(&mut self) {
    self.finished_at = Some(Utc::now());
  }

  pub fn failures(&self) -> Vec<String> {
    self.platforms.iter().filter_map(PlatformOutcome::failure_line).collect()
  }

  pub fn succeeded(&self) -> bool {
    self.failures().is_empty() && !self.state.is_incomplete() && self.verify_error.is_none()
  }

  pub fn path(staging_root: &Path, event: RunEvent) -> PathBuf {
    match event {
      RunEvent::Publish => staging_root.join(Self::FILE_NAME),
      RunEvent::PreMerge => staging_root.join(Self::PRE_MERGE_FILE_NAME),
    }
  }

  pub fn save(&self, staging_root: &Path) -> HoistResult<PathBuf> {
    fs::create_dir_all(staging_root)
      .with_context(|| format!("Failed to create staging root {}", staging_root.display()))?;
    let path = Self::path(staging_root, self.event);
    let json = serde_json::to_string_pretty(self)?;
    fs::write(&path, json).with_context(|| format!("Failed to write run record {}", path.display()))?;
    Ok(path)
  }

  pub fn load(staging_root: &Path, event: RunEvent) -> HoistResult<Self> {
    let path = Self::path(staging_root, event);
    let json = fs::read_to_string(&path).with_context(|| format!("Failed to read run record {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
  }
}

/// Stable identifier for (event, commit)
fn run_id(event: RunEvent, commit: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(format!("{:?}", event).as_bytes());
  hasher.update(b"\0");
  hasher.update(commit.as_bytes());
  let digest = format!("{:x}", hasher.finalize());
  digest[..16].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lifecycle_complete() {
    let state = ReleaseState::Unpublished.publish();
    assert_eq!(state, ReleaseState::Published);
    let actual = vec!["app".to_string(), "app.desktop".to_string(), "app.png".to_string()];
    let state = state.verify(["app", "app.desktop", "app.png"], &actual);
    assert_eq!(state, ReleaseState::AssetsComplete);
  }

  #[test]
  fn test_lifecycle_incomplete_lists_missing() {
    let actual = vec!["app".to_string()];
    let state = ReleaseState::Published.verify(["app.png", "app", "app.desktop"], &actual);
    assert_eq!(
      state,
      ReleaseState::PublishedIncomplete {
        missing: vec!["app.desktop".to_string(), "app.png".to_string()]
      }
    );
    assert!(state.is_incomplete());
  }

  #[test]
  fn test_unpublished_cannot_be_verified() {
    let state = ReleaseState::Unpublished.verify(["app"], &[]);
    assert_eq!(state, ReleaseState::Unpublished);
  }

  #[test]
  fn test_run_id_is_stable() {
    let a = RunRecord::new(RunEvent::Publish, "abc");
    let b = RunRecord::new(RunEvent::Publish, "abc");
    let c = RunRecord::new(RunEvent::PreMerge, "abc");
    assert_eq!(a.run_id, b.run_id);
    assert_ne!(a.run_id, c.run_id);
    assert_eq!(a.run_id.len(), 16);
  }

  #[test]
  fn test_record_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = RunRecord::new(RunEvent::Publish, "abc");
    record.tag = Some("v0.2.0".to_string());
    record.state = ReleaseState::PublishedIncomplete {
      missing: vec!["app.png".to_string()],
    };
    record.platforms.push(PlatformOutcome {
      platform: "linux".to_string(),
      target: "x86_64-unknown-linux-gnu".to_string(),
      status: JobStatus::Failed {
        stage: Stage::Upload,
        reason: "HTTP 502".to_string(),
      },
      staged: Vec::new(),
      uploaded: vec!["app".to_string()],
    });
    record.finish();

    let path = record.save(dir.path()).unwrap();
    assert!(path.ends_with(RunRecord::FILE_NAME));
    let loaded = RunRecord::load(dir.path(), RunEvent::Publish).unwrap();
    assert_eq!(loaded.state, record.state);
    assert_eq!(loaded.failures(), vec!["linux: upload: HTTP 502"]);
    assert!(!loaded.succeeded());
  }

  #[test]
  fn test_pre_merge_record_does_not_replace_publish_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut publish = RunRecord::new(RunEvent::Publish, "abc");
    publish.tag = Some("v0.4.0".to_string());
    publish.save(dir.path()).unwrap();

    let pre_merge_path = RunRecord::new(RunEvent::PreMerge, "def").save(dir.path()).unwrap();
    assert!(pre_merge_path.ends_with(RunRecord::PRE_MERGE_FILE_NAME));

    let loaded = RunRecord::load(dir.path(), RunEvent::Publish).unwrap();
    assert_eq!(loaded.tag.as_deref(), Some("v0.4.0"));
    assert_eq!(RunRecord::load(dir.path(), RunEvent::PreMerge).unwrap().commit, "def");
  }

  #[test]
  fn test_verify_error_fails_run() {
    let mut record = RunRecord::new(RunEvent::Publish, "abc");
    record.state = ReleaseState::Published;
    assert!(record.succeeded());
    record.verify_error = Some("HTTP 502".to_string());
    assert!(!record.succeeded());
  }
}

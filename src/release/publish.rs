//! Release creation
//!
//! The tag is claimed by reading before writing: an existing release for the
//! tag is reused when it was cut from the same commit and refused otherwise.
//! Creation is never retried.

use crate::core::config::ReleasePolicy;
use crate::core::error::{HoistError, HostError, HoistResult};
use crate::host::{NewRelease, Release, ReleaseHost};
use crate::release::tag::ReleaseTag;
use serde::Serialize;

/// Whether this run created the release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
  Created,
  /// A release for this tag and commit already existed
  Reused,
}

#[derive(Debug, Clone)]
pub struct Published {
  pub release: Release,
  pub outcome: PublishOutcome,
}

/// Publish the release for `tag` cut from `commit`
pub fn publish_release(
  host: &dyn ReleaseHost,
  policy: &ReleasePolicy,
  tag: &ReleaseTag,
  commit: &str,
) -> HoistResult<Published> {
  let tag_name = tag.to_string();
  let publish_failed = |reason: String| {
    HoistError::Host(HostError::PublishFailed {
      tag: tag_name.clone(),
      reason,
    })
  };

  let existing = host.find_release(&tag_name).map_err(|e| publish_failed(e.to_string()))?;
  if let Some(existing) = existing {
    return reuse(existing, commit).map_err(publish_failed);
  }

  let request = NewRelease {
    tag: tag_name.clone(),
    title: policy.render_title(&tag_name, commit),
    notes: policy.render_notes(&tag_name, commit),
    target_commit: commit.to_string(),
  };

  match host.create_release(&request) {
    Ok(release) => {
      if release.draft || release.prerelease {
        return Err(publish_failed(
          "host recorded the release as a draft or prerelease".to_string(),
        ));
      }
      log::info!("created release {} at {}", release.tag, commit);
      Ok(Published {
        release,
        outcome: PublishOutcome::Created,
      })
    }
    Err(create_err) => {
      // A concurrent or earlier run may have claimed the tag in between
      match host.find_release(&tag_name) {
        Ok(Some(existing)) => reuse(existing, commit).map_err(publish_failed),
        _ => Err(publish_failed(create_err.to_string())),
      }
    }
  }
}

fn reuse(existing: Release, commit: &str) -> Result<Published, String> {
  match existing.target_commit.as_deref() {
    Some(target) if target == commit => {
      log::info!("release {} already exists for {}, reusing it", existing.tag, commit);
      Ok(Published {
        release: existing,
        outcome: PublishOutcome::Reused,
      })
    }
    Some(target) => Err(format!("tag is already claimed by a release of commit {}", target)),
    None => Err("tag is already claimed by a release of an unknown commit".to_string()),
  }
}

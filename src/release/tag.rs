//! Release tags and next-tag resolution
//!
//! Tags follow `v0.<minor>.0`. The next tag is derived from the latest
//! published release on the host:
//!
//! | latest release      | next tag        |
//! |---------------------|-----------------|
//! | none                | `v0.1.0`        |
//! | `v0.N.0`            | `v0.(N+1).0`    |
//! | anything else       | `v0.1.0` (fallback, refused unless allowed) |

use crate::core::error::{HoistError, HostError, HoistResult};
use crate::host::{Release, ReleaseHost};
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v0\.(\d+)\.0$").expect("static tag pattern"));

/// A `v0.<minor>.0` release tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseTag {
  minor: u64,
}

impl ReleaseTag {
  /// The tag used when there is nothing to increment
  pub const DEFAULT: ReleaseTag = ReleaseTag { minor: 1 };

  pub fn new(minor: u64) -> Self {
    Self { minor }
  }

  /// Parse `v0.<minor>.0`; anything else (including overflowing minors) is `None`
  pub fn parse(tag: &str) -> Option<Self> {
    let captures = TAG_PATTERN.captures(tag)?;
    let minor = captures.get(1)?.as_str().parse().ok()?;
    Some(Self { minor })
  }

  /// The following tag, or `None` if the minor cannot grow
  pub fn next(&self) -> Option<Self> {
    self.minor.checked_add(1).map(Self::new)
  }

  pub fn version(&self) -> Version {
    Version::new(0, self.minor, 0)
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v0.{}.0", self.minor)
  }
}

/// Why a tag was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagSource {
  /// The repository has no published release yet
  NoPriorRelease,
  /// Incremented from the latest release
  Incremented { from: String },
  /// The latest release is outside the scheme; restarted at the default
  Fallback { unrecognized: String },
  /// The latest release was already cut from this commit and is reused
  Rerun { existing: String },
}

/// Computed next tag with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTag {
  pub tag: ReleaseTag,
  pub source: TagSource,
}

/// Compute the next tag from the latest published tag
pub fn next_tag(latest: Option<&str>) -> NextTag {
  let Some(latest) = latest else {
    return NextTag {
      tag: ReleaseTag::DEFAULT,
      source: TagSource::NoPriorRelease,
    };
  };

  match ReleaseTag::parse(latest).and_then(|tag| tag.next()) {
    Some(tag) => NextTag {
      tag,
      source: TagSource::Incremented {
        from: latest.to_string(),
      },
    },
    None => NextTag {
      tag: ReleaseTag::DEFAULT,
      source: TagSource::Fallback {
        unrecognized: latest.to_string(),
      },
    },
  }
}

/// Outcome of resolving against the host
#[derive(Debug, Clone)]
pub struct Resolution {
  /// Latest release observed before anything was written
  pub observed_latest: Option<Release>,
  pub next: NextTag,
}

/// Query the host and decide the tag for this run.
///
/// - A query failure aborts; nothing has been claimed yet.
/// - A fallback is refused unless `allow_fallback` is set.
/// - If `commit` is given and the latest release was cut from it, that tag is
///   reused so a rerun never claims a second tag for the same commit.
pub fn resolve_next_tag(host: &dyn ReleaseHost, allow_fallback: bool, commit: Option<&str>) -> HoistResult<Resolution> {
  let observed_latest = host.latest_release().map_err(|e| {
    HoistError::Host(HostError::QueryFailed {
      reason: e.to_string(),
    })
  })?;

  if let (Some(latest), Some(commit)) = (&observed_latest, commit)
    && latest.target_commit.as_deref() == Some(commit)
    && let Some(existing) = ReleaseTag::parse(&latest.tag)
  {
    log::info!("release {} already points at {}, reusing it", latest.tag, commit);
    return Ok(Resolution {
      next: NextTag {
        tag: existing,
        source: TagSource::Rerun {
          existing: latest.tag.clone(),
        },
      },
      observed_latest,
    });
  }

  let next = next_tag(observed_latest.as_ref().map(|r| r.tag.as_str()));
  if let TagSource::Fallback { unrecognized } = &next.source {
    if !allow_fallback {
      log::warn!("latest release tag {} is outside v0.<minor>.0; refusing to restart", unrecognized);
      return Err(HoistError::Host(HostError::UnrecognizedTag {
        tag: unrecognized.clone(),
      }));
    }
    log::warn!(
      "latest release tag {} is outside v0.<minor>.0; restarting at {}",
      unrecognized,
      next.tag
    );
  }

  Ok(Resolution { observed_latest, next })
}

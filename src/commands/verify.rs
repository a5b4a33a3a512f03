//! `cargo hoist verify` - check that a release carries every expected asset

use crate::core::context::WorkspaceContext;
use crate::core::error::{HoistError, HoistResult, RunFailure};
use crate::host::{GhCli, ReleaseHost};
use crate::release::{ReleaseState, ReleaseTag, RunEvent, RunRecord};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct VerifyOutput {
  tag: String,
  state: ReleaseState,
  attached: Vec<String>,
}

/// Run the verify command against the hosting platform.
///
/// Without a tag, the tag of the last recorded run is checked.
pub fn run_verify(ctx: &WorkspaceContext, tag: Option<String>, json: bool) -> HoistResult<()> {
  let config = ctx.require_config()?;
  let tag = match tag {
    Some(tag) => tag,
    None => last_run_tag(&ctx.staging_root()?)?,
  };
  let tag = tag.as_str();
  if ReleaseTag::parse(tag).is_none() {
    log::warn!("{} is outside v0.<minor>.0; verifying anyway", tag);
  }

  let host = GhCli::new(ctx.workspace_root(), config.project.repo.clone());
  let release = host
    .find_release(tag)?
    .ok_or_else(|| HoistError::message(format!("Release {} not found", tag)))?;

  let expected: Vec<String> = config.platforms.iter().flat_map(|p| p.expected_assets()).collect();
  let state = ReleaseState::Published.verify(expected.iter().map(String::as_str), &release.assets);

  if json {
    let output = VerifyOutput {
      tag: tag.to_string(),
      state: state.clone(),
      attached: release.assets.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    match &state {
      ReleaseState::AssetsComplete => {
        println!("✅ {} has all {} expected asset(s)", tag, expected.len())
      }
      ReleaseState::PublishedIncomplete { missing } => {
        println!("⚠️  {} is published but incomplete", tag);
        for asset in missing {
          println!("   missing: {}", asset);
        }
      }
      ReleaseState::Unpublished | ReleaseState::Published => {}
    }
  }

  match state {
    ReleaseState::PublishedIncomplete { missing } => Err(HoistError::Run(RunFailure {
      tag: Some(tag.to_string()),
      failures: vec![format!("release: verify: missing {}", missing.join(", "))],
      release_incomplete: true,
    })),
    _ => Ok(()),
  }
}

fn last_run_tag(staging_root: &Path) -> HoistResult<String> {
  let record = RunRecord::load(staging_root, RunEvent::Publish).map_err(|_| {
    HoistError::with_help(
      format!("No run record under {}", staging_root.display()),
      "Pass the tag to verify, e.g. `cargo hoist verify v0.3.0`",
    )
  })?;
  record.tag.ok_or_else(|| {
    HoistError::with_help(
      format!("Last run {} did not publish a release", record.run_id),
      "Pass the tag to verify explicitly",
    )
  })
}

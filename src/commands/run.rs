//! `cargo hoist run` - the full release workflow

use crate::core::context::WorkspaceContext;
use crate::core::error::HoistResult;
use crate::core::run::{Orchestrator, RunOptions, RunReport};
use crate::core::vcs::{SystemGit, is_valid_sha};
use crate::host::GhCli;
use crate::matrix::CargoToolchain;
use crate::release::{JobStatus, ReleaseState, RunEvent, TagSource};

/// Run the release workflow for one trigger event
pub fn run_release(
  ctx: &WorkspaceContext,
  event: RunEvent,
  commit: Option<String>,
  platforms: Vec<String>,
  allow_tag_fallback: bool,
  json: bool,
  no_progress: bool,
) -> HoistResult<()> {
  let config = ctx.require_config()?;
  let workspace_root = ctx.workspace_root();

  // A full SHA is taken as is; anything else needs the checkout
  let commit = match commit {
    Some(sha) if is_valid_sha(&sha) => sha,
    Some(rev) => SystemGit::open(workspace_root)?.resolve_commit(&rev)?,
    None => SystemGit::open(workspace_root)?.head_commit()?,
  };

  let host = GhCli::new(workspace_root, config.project.repo.clone());
  let toolchain = CargoToolchain::new(workspace_root, &config.project.bin)?;

  if !json {
    let label = match event {
      RunEvent::Publish => "publish",
      RunEvent::PreMerge => "pre-merge",
    };
    println!("🚀 Release run ({}) at {}", label, &commit[..12]);
  }

  let mut orchestrator = Orchestrator::new(config, workspace_root, &host, &toolchain);
  if !json && !no_progress {
    orchestrator = orchestrator.with_progress();
  }

  let options = RunOptions {
    event,
    commit,
    allow_tag_fallback,
    platforms,
  };
  let report = orchestrator.run(&options)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report.record)?);
  } else {
    print_summary(&report);
  }

  report.into_result().map(|_| ())
}

fn print_summary(report: &RunReport) {
  let record = &report.record;
  println!();

  if let (Some(tag), Some(source)) = (&record.tag, &record.tag_source) {
    let how = match source {
      TagSource::NoPriorRelease => "first release".to_string(),
      TagSource::Incremented { from } => format!("after {}", from),
      TagSource::Fallback { unrecognized } => format!("fallback, latest was '{}'", unrecognized),
      TagSource::Rerun { .. } => "rerun, release reused".to_string(),
    };
    let action = if record.release_created { "published" } else { "reused" };
    println!("🏷️  {} {} ({})", tag, action, how);
  }

  for platform in &record.platforms {
    match &platform.status {
      JobStatus::Succeeded => {
        let detail = if platform.uploaded.is_empty() {
          format!("{} staged", platform.staged.len())
        } else {
          format!("{} uploaded", platform.uploaded.len())
        };
        println!("  ✅ {:<12} {}", platform.platform, detail);
      }
      JobStatus::Failed { stage, reason } => {
        println!("  ❌ {:<12} {} failed", platform.platform, stage);
        for line in reason.lines().take(5) {
          println!("       {}", line);
        }
      }
    }
  }

  println!();
  match &record.state {
    ReleaseState::AssetsComplete => println!("✅ Release complete"),
    ReleaseState::PublishedIncomplete { missing } => {
      println!("⚠️  Release published but missing: {}", missing.join(", "))
    }
    ReleaseState::Unpublished => println!("📦 Pre-merge run: artifacts built and staged, nothing uploaded"),
    ReleaseState::Published => {
      if let Some(reason) = &record.verify_error {
        println!("⚠️  Release published but its assets could not be checked: {}", reason);
      }
    }
  }

  if let Some(path) = &report.record_path {
    println!("📝 Run record: {}", path.display());
  }
}

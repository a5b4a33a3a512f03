//! `cargo hoist next-tag` - compute the tag the next release would claim

use crate::core::context::WorkspaceContext;
use crate::core::error::{HoistError, HostError, HoistResult};
use crate::host::GhCli;
use crate::release::{NextTag, TagSource, next_tag, resolve_next_tag};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct NextTagOutput {
  latest: Option<String>,
  next: String,
  version: String,
  source: TagSource,
}

/// Run the next-tag command.
///
/// With `latest` (or `no_prior`) nothing is queried; otherwise the hosting
/// platform is asked for its latest release.
pub fn run_next_tag(
  ctx: &WorkspaceContext,
  latest: Option<String>,
  no_prior: bool,
  allow_fallback: bool,
  json: bool,
) -> HoistResult<()> {
  let allow_fallback = allow_fallback || ctx.config.as_ref().is_some_and(|c| c.release.allow_tag_fallback);

  let (latest, next) = if latest.is_some() || no_prior {
    let next = next_tag(latest.as_deref());
    if let TagSource::Fallback { unrecognized } = &next.source
      && !allow_fallback
    {
      return Err(HoistError::Host(HostError::UnrecognizedTag {
        tag: unrecognized.clone(),
      }));
    }
    (latest, next)
  } else {
    let repo = ctx.config.as_ref().and_then(|c| c.project.repo.clone());
    let host = GhCli::new(ctx.workspace_root(), repo);
    let resolution = resolve_next_tag(&host, allow_fallback, None)?;
    (resolution.observed_latest.map(|r| r.tag), resolution.next)
  };

  print_next(latest, next, json)
}

fn print_next(latest: Option<String>, next: NextTag, json: bool) -> HoistResult<()> {
  if json {
    let output = NextTagOutput {
      latest,
      next: next.tag.to_string(),
      version: next.tag.version().to_string(),
      source: next.source,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  match &next.source {
    TagSource::NoPriorRelease => println!("{}  (no prior release)", next.tag),
    TagSource::Incremented { from } => println!("{}  (after {})", next.tag, from),
    TagSource::Fallback { unrecognized } => {
      println!("{}  (fallback: '{}' is outside v0.<minor>.0)", next.tag, unrecognized)
    }
    TagSource::Rerun { existing } => println!("{}  (reusing {})", next.tag, existing),
  }
  Ok(())
}

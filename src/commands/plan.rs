//! `cargo hoist plan` - show the job graph and the assets each job attaches

use crate::core::context::WorkspaceContext;
use crate::core::error::{HoistError, HoistResult};
use crate::matrix::JobGraph;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PlannedJob {
  platform: String,
  target: String,
  depends_on: Vec<String>,
  assets: Vec<String>,
}

/// Run the plan command; `format` is one of text, json, dot
pub fn run_plan(ctx: &WorkspaceContext, format: &str) -> HoistResult<()> {
  let config = ctx.require_config()?;
  let graph = JobGraph::from_matrix(&config.platforms);

  let jobs: Vec<PlannedJob> = graph
    .platform_jobs()
    .into_iter()
    .map(|spec| PlannedJob {
      platform: spec.platform_suffix.clone(),
      target: spec.target_id.clone(),
      depends_on: graph
        .dependencies_of(&spec.platform_suffix)
        .iter()
        .map(|node| node.to_string())
        .collect(),
      assets: spec.expected_assets(),
    })
    .collect();

  match format {
    "json" => println!("{}", serde_json::to_string_pretty(&jobs)?),
    "dot" => println!("{}", graph.to_dot()),
    "text" => {
      println!("🎯 Release plan for '{}'", config.project.bin);
      println!();
      println!("  1. release   resolve next tag, publish release (gates everything below)");
      println!("  2. matrix    {} job(s) in parallel:", jobs.len());
      for job in &jobs {
        println!();
        println!("     {} ({})", job.platform, job.target);
        for asset in &job.assets {
          println!("       - {}", asset);
        }
      }
      println!();
      println!("Pre-merge runs build and package every job but upload nothing.");
    }
    other => {
      return Err(HoistError::with_help(
        format!("Unknown format '{}'", other),
        "Use one of: text, json, dot",
      ));
    }
  }

  Ok(())
}

//! Job graph: one release gate, one job per platform
//!
//! ```text
//!            +--> build/package/upload (linux)
//!   gate ----+--> build/package/upload (windows)
//!            +--> build/package/upload (macos)
//! ```
//!
//! Every platform job has exactly one predecessor, the gate. Platform jobs
//! have no edges between each other.

use crate::core::config::PlatformSpec;
use crate::core::error::{ConfigError, HoistError, HoistResult};
use petgraph::Direction;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobNode {
  /// Resolve the next tag and publish the release
  Gate,
  /// Build, package and upload one platform
  Platform(PlatformSpec),
}

impl fmt::Display for JobNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      JobNode::Gate => write!(f, "release"),
      JobNode::Platform(spec) => write!(f, "{} ({})", spec.platform_suffix, spec.target_id),
    }
  }
}

#[derive(Debug)]
pub struct JobGraph {
  graph: DiGraph<JobNode, &'static str>,
  gate: NodeIndex,
}

impl JobGraph {
  /// Build the graph for the given matrix
  pub fn from_matrix(platforms: &[PlatformSpec]) -> Self {
    let mut graph = DiGraph::new();
    let gate = graph.add_node(JobNode::Gate);
    for spec in platforms {
      let node = graph.add_node(JobNode::Platform(spec.clone()));
      graph.add_edge(gate, node, "unlocks");
    }
    Self { graph, gate }
  }

  /// Restrict the matrix to the named platform suffixes
  pub fn select(platforms: &[PlatformSpec], only: &[String]) -> HoistResult<Self> {
    if only.is_empty() {
      return Ok(Self::from_matrix(platforms));
    }
    let mut selected = Vec::with_capacity(only.len());
    for suffix in only {
      let spec = platforms
        .iter()
        .find(|p| &p.platform_suffix == suffix)
        .ok_or_else(|| {
          HoistError::Config(ConfigError::PlatformNotFound {
            suffix: suffix.to_string(),
          })
        })?;
      if !selected.contains(spec) {
        selected.push(spec.clone());
      }
    }
    Ok(Self::from_matrix(&selected))
  }

  /// Platform jobs unlocked by the gate, in matrix order
  pub fn platform_jobs(&self) -> Vec<&PlatformSpec> {
    let mut successors: Vec<NodeIndex> = self.graph.neighbors_directed(self.gate, Direction::Outgoing).collect();
    successors.sort();
    successors
      .into_iter()
      .filter_map(|idx| match &self.graph[idx] {
        JobNode::Platform(spec) => Some(spec),
        JobNode::Gate => None,
      })
      .collect()
  }

  /// Predecessors of a platform job; only ever the gate
  pub fn dependencies_of(&self, suffix: &str) -> Vec<&JobNode> {
    self
      .graph
      .node_indices()
      .find(|&idx| matches!(&self.graph[idx], JobNode::Platform(spec) if spec.platform_suffix == suffix))
      .map(|idx| {
        self
          .graph
          .neighbors_directed(idx, Direction::Incoming)
          .map(|p| &self.graph[p])
          .collect()
      })
      .unwrap_or_default()
  }

  /// Graphviz rendering for `cargo hoist plan --format dot`
  pub fn to_dot(&self) -> String {
    format!("{}", Dot::new(&self.graph))
  }
}

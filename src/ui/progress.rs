//! Progress indicators for the platform matrix
//!
//! Uses `linya` for allocation-free, concurrency-optimized progress bars.
//! One bar per platform job, advanced once per finished stage.

use linya::{Bar, Progress};
use std::sync::{Arc, Mutex, MutexGuard};

/// Stages a platform job advances through (build, package, upload)
pub const STAGES_PER_JOB: usize = 3;

/// Thread-safe multi-bar progress for parallel platform jobs
#[derive(Clone)]
pub struct MatrixProgress {
  progress: Arc<Mutex<Progress>>,
}

impl MatrixProgress {
  pub fn new() -> Self {
    Self {
      progress: Arc::new(Mutex::new(Progress::new())),
    }
  }

  /// Add a bar for one platform job
  pub fn add_job(&self, label: impl Into<String>) -> Bar {
    self.lock().bar(STAGES_PER_JOB, label.into())
  }

  /// Mark one stage of a job finished
  pub fn advance(&self, bar: &Bar) {
    self.lock().inc_and_draw(bar, 1);
  }

  /// Fill a job's bar (skipped or failed stages)
  pub fn complete(&self, bar: &Bar) {
    self.lock().set_and_draw(bar, STAGES_PER_JOB);
  }

  fn lock(&self) -> MutexGuard<'_, Progress> {
    self.progress.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl Default for MatrixProgress {
  fn default() -> Self {
    Self::new()
  }
}

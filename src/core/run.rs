//! Release run orchestration
//!
//! ```text
//! gate:      resolve next tag -> publish release          (sequential, fail-closed)
//!              |
//! fan-out:     +-> build -> package -> upload   (platform A)
//!              +-> build -> package -> upload   (platform B)   parallel, independent
//!              |
//! join:      verify assets on release -> run record
//! ```
//!
//! Pre-merge runs skip the gate and the upload stage entirely: no host call is
//! made, every platform is still built and packaged.

use crate::core::config::{HoistConfig, PlatformSpec};
use crate::core::error::{HoistError, HoistResult, HostError, RunFailure};
use crate::host::{Release, ReleaseHost};
use crate::matrix::{BuildToolchain, JobGraph, Packager, build_platform, publish_assets};
use crate::release::{
  JobStatus, PlatformOutcome, PublishOutcome, ReleaseState, RunEvent, RunRecord, Stage, publish_release,
  resolve_next_tag,
};
use crate::ui::MatrixProgress;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Trigger context for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub event: RunEvent,
  /// Full commit SHA the release is cut from
  pub commit: String,
  /// Overrides `[release].allow_tag_fallback` when set
  pub allow_tag_fallback: bool,
  /// Restrict the matrix to these platform suffixes (empty = all)
  pub platforms: Vec<String>,
}

/// Result of a run whose gate succeeded (or was skipped)
#[derive(Debug)]
pub struct RunReport {
  pub record: RunRecord,
  pub record_path: Option<PathBuf>,
}

impl RunReport {
  /// Turn per-platform failures and incomplete releases into an error
  pub fn into_result(self) -> HoistResult<RunRecord> {
    if self.record.succeeded() {
      return Ok(self.record);
    }
    let mut failures = self.record.failures();
    if let ReleaseState::PublishedIncomplete { missing } = &self.record.state {
      failures.push(format!("release: verify: missing {}", missing.join(", ")));
    }
    if let Some(reason) = &self.record.verify_error {
      failures.push(format!("release: verify: {}", reason));
    }
    Err(HoistError::Run(RunFailure {
      tag: self.record.tag.clone(),
      failures,
      release_incomplete: self.record.state.is_incomplete(),
    }))
  }
}

pub struct Orchestrator<'a> {
  config: &'a HoistConfig,
  workspace_root: &'a Path,
  staging_root: PathBuf,
  host: &'a dyn ReleaseHost,
  toolchain: &'a dyn BuildToolchain,
  progress: Option<MatrixProgress>,
}

impl<'a> Orchestrator<'a> {
  pub fn new(
    config: &'a HoistConfig,
    workspace_root: &'a Path,
    host: &'a dyn ReleaseHost,
    toolchain: &'a dyn BuildToolchain,
  ) -> Self {
    Self {
      config,
      workspace_root,
      staging_root: workspace_root.join(&config.project.staging_dir),
      host,
      toolchain,
      progress: None,
    }
  }

  /// Draw one progress bar per platform job
  pub fn with_progress(mut self) -> Self {
    self.progress = Some(MatrixProgress::new());
    self
  }

  /// Execute the gate, then every platform job, then verification.
  ///
  /// Gate failures are returned as errors before any platform job starts.
  /// Platform failures are recorded in the report; see [`RunReport::into_result`].
  pub fn run(&self, options: &RunOptions) -> HoistResult<RunReport> {
    let graph = JobGraph::select(&self.config.platforms, &options.platforms)?;
    let mut record = RunRecord::new(options.event, &options.commit);

    let release = if options.event.uploads_assets() {
      Some(self.run_gate(options, &mut record)?)
    } else {
      log::info!("pre-merge run: skipping release gate and uploads");
      None
    };

    let jobs = graph.platform_jobs();
    let bars: Option<Vec<_>> = self.progress.as_ref().map(|progress| {
      jobs
        .iter()
        .map(|spec| progress.add_job(format!("{:<10}", spec.platform_suffix)))
        .collect()
    });

    record.platforms = jobs
      .par_iter()
      .enumerate()
      .map(|(idx, spec)| {
        let bar = self.progress.as_ref().zip(bars.as_ref()).map(|(p, bars)| (p, &bars[idx]));
        let outcome = self.run_platform(spec, release.as_ref(), bar);
        if let Some((progress, bar)) = bar {
          progress.complete(bar);
        }
        outcome
      })
      .collect();

    if let Some(release) = &release {
      let expected: Vec<String> = jobs.iter().flat_map(|spec| spec.expected_assets()).collect();
      match self.host.list_assets(&release.tag) {
        Ok(actual) => {
          record.state = record.state.clone().verify(expected.iter().map(String::as_str), &actual);
        }
        // The release stays Published: live, but not known to be complete
        Err(err) => {
          log::error!("could not list assets of {}: {}", release.tag, err);
          record.verify_error = Some(err.to_string());
        }
      }
    }

    record.finish();
    let record_path = match record.save(&self.staging_root) {
      Ok(path) => Some(path),
      Err(err) => {
        log::warn!("could not write run record: {}", err);
        None
      }
    };

    Ok(RunReport { record, record_path })
  }

  /// Resolve the tag and publish the release
  fn run_gate(&self, options: &RunOptions, record: &mut RunRecord) -> HoistResult<Release> {
    let allow_fallback = options.allow_tag_fallback || self.config.release.allow_tag_fallback;
    let resolution = resolve_next_tag(self.host, allow_fallback, Some(&options.commit))?;
    record.observed_latest = resolution.observed_latest.as_ref().map(|r| r.tag.clone());
    record.tag = Some(resolution.next.tag.to_string());
    record.tag_source = Some(resolution.next.source.clone());

    let published = publish_release(self.host, &self.config.release, &resolution.next.tag, &options.commit)?;
    record.release_created = published.outcome == PublishOutcome::Created;
    record.state = record.state.clone().publish();
    Ok(published.release)
  }

  /// One platform job: build -> package -> upload (publish events only)
  fn run_platform(
    &self,
    spec: &PlatformSpec,
    release: Option<&Release>,
    progress: Option<(&MatrixProgress, &linya::Bar)>,
  ) -> PlatformOutcome {
    let mut outcome = PlatformOutcome {
      platform: spec.platform_suffix.clone(),
      target: spec.target_id.clone(),
      status: JobStatus::Succeeded,
      staged: Vec::new(),
      uploaded: Vec::new(),
    };
    let advance = || {
      if let Some((progress, bar)) = progress {
        progress.advance(bar);
      }
    };
    let fail = |outcome: &mut PlatformOutcome, stage: Stage, err: HoistError| {
      log::error!("{}: {} failed: {}", spec.platform_suffix, stage, err);
      outcome.status = JobStatus::Failed {
        stage,
        reason: err.to_string(),
      };
    };

    let binary = match build_platform(self.toolchain, spec) {
      Ok(binary) => binary,
      Err(err) => {
        fail(&mut outcome, Stage::Build, err);
        return outcome;
      }
    };
    advance();

    let packager = Packager::new(
      &self.staging_root,
      self.workspace_root,
      &self.config.application,
      self.config.display_name(),
    );
    let bundle = match packager.package(spec, &binary) {
      Ok(bundle) => bundle,
      Err(err) => {
        fail(&mut outcome, Stage::Package, err);
        return outcome;
      }
    };
    outcome.staged = bundle.staged_assets();
    advance();

    let Some(release) = release else {
      return outcome;
    };

    match publish_assets(self.host, release, &bundle) {
      Ok(uploaded) => {
        outcome.uploaded = uploaded;
        advance();
      }
      Err(err) => {
        if let HoistError::Host(HostError::UploadFailed { uploaded, .. }) = &err {
          outcome.uploaded = uploaded.clone();
        }
        fail(&mut outcome, Stage::Upload, err);
      }
    }
    outcome
  }
}

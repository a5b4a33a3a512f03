//! GitHub release host via the `gh` CLI
//!
//! Authentication is whatever `gh` is configured with (`gh auth login`,
//! `GH_TOKEN`), so unlike git the environment is passed through.

use crate::core::error::{HoistError, HostError, HoistResult, ResultExt};
use crate::host::{AssetRef, NewRelease, Release, ReleaseHost};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const VIEW_FIELDS: &str = "tagName,name,body,isDraft,isPrerelease,targetCommitish,assets";

/// Release host backed by the GitHub CLI
pub struct GhCli {
  /// Directory `gh` runs in (used to infer the repository)
  workdir: PathBuf,
  /// Explicit `owner/name`, passed as `--repo`
  repo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRelease {
  tag_name: String,
  #[serde(default)]
  name: String,
  #[serde(default)]
  body: String,
  #[serde(default)]
  is_draft: bool,
  #[serde(default)]
  is_prerelease: bool,
  #[serde(default)]
  target_commitish: Option<String>,
  #[serde(default)]
  assets: Vec<GhAsset>,
}

#[derive(Debug, Deserialize)]
struct GhAsset {
  name: String,
}

impl From<GhRelease> for Release {
  fn from(gh: GhRelease) -> Self {
    Self {
      tag: gh.tag_name,
      title: gh.name,
      notes: gh.body,
      draft: gh.is_draft,
      prerelease: gh.is_prerelease,
      target_commit: gh.target_commitish.filter(|c| !c.is_empty()),
      assets: gh.assets.into_iter().map(|a| a.name).collect(),
    }
  }
}

impl GhCli {
  pub fn new(workdir: &Path, repo: Option<String>) -> Self {
    Self {
      workdir: workdir.to_path_buf(),
      repo,
    }
  }

  /// `gh release <args...> [--repo owner/name]`
  fn release_cmd(&self, args: &[&str]) -> Command {
    let mut cmd = Command::new("gh");
    cmd.current_dir(&self.workdir).arg("release").args(args);
    if let Some(repo) = &self.repo {
      cmd.arg("--repo").arg(repo);
    }
    cmd
  }

  fn run(&self, args: &[&str]) -> HoistResult<Output> {
    log::debug!("gh release {}", args.join(" "));
    self
      .release_cmd(args)
      .output()
      .with_context(|| format!("Failed to execute gh release {}", args.first().copied().unwrap_or_default()))
  }

  /// `gh release view [tag]`; `None` when gh reports the release missing
  fn view(&self, tag: Option<&str>) -> HoistResult<Option<Release>> {
    let mut args = vec!["view"];
    if let Some(tag) = tag {
      args.push(tag);
    }
    args.extend(["--json", VIEW_FIELDS]);

    let output = self.run(&args)?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if is_not_found(&stderr) {
        return Ok(None);
      }
      return Err(HoistError::Host(HostError::CommandFailed {
        command: format!("gh release {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    parse_view(&String::from_utf8(output.stdout)?).map(Some)
  }
}

impl ReleaseHost for GhCli {
  fn latest_release(&self) -> HoistResult<Option<Release>> {
    self.view(None)
  }

  fn find_release(&self, tag: &str) -> HoistResult<Option<Release>> {
    self.view(Some(tag))
  }

  fn create_release(&self, release: &NewRelease) -> HoistResult<Release> {
    let args = [
      "create",
      release.tag.as_str(),
      "--title",
      release.title.as_str(),
      "--notes",
      release.notes.as_str(),
      "--target",
      release.target_commit.as_str(),
    ];
    let output = self.run(&args)?;
    if !output.status.success() {
      return Err(HoistError::Host(HostError::CommandFailed {
        command: format!("gh release create {}", release.tag),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    // Read back what the platform actually recorded
    match self.view(Some(&release.tag))? {
      Some(created) => Ok(created),
      None => Ok(Release {
        tag: release.tag.clone(),
        title: release.title.clone(),
        notes: release.notes.clone(),
        draft: false,
        prerelease: false,
        target_commit: Some(release.target_commit.clone()),
        assets: Vec::new(),
      }),
    }
  }

  fn upload_asset(&self, tag: &str, path: &Path, clobber: bool) -> HoistResult<AssetRef> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| HoistError::message(format!("Asset path has no file name: {}", path.display())))?;

    let path_arg = path.to_string_lossy();
    let mut args = vec!["upload", tag, path_arg.as_ref()];
    if clobber {
      args.push("--clobber");
    }

    let output = self.run(&args)?;
    if !output.status.success() {
      return Err(HoistError::Host(HostError::CommandFailed {
        command: format!("gh release upload {} {}", tag, name),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(AssetRef {
      tag: tag.to_string(),
      name,
    })
  }

  fn list_assets(&self, tag: &str) -> HoistResult<Vec<String>> {
    self
      .view(Some(tag))?
      .map(|release| release.assets)
      .ok_or_else(|| HoistError::message(format!("Release {} not found", tag)))
  }
}

/// gh exits non-zero with this message when no release matches
fn is_not_found(stderr: &str) -> bool {
  let stderr = stderr.to_ascii_lowercase();
  stderr.contains("release not found") || stderr.contains("http 404")
}

fn parse_view(json: &str) -> HoistResult<Release> {
  let release: GhRelease = serde_json::from_str(json).context("Failed to parse gh release view output")?;
  Ok(release.into())
}

//! Asset publisher
//!
//! Uploads a staging bundle to an already-published release with clobber
//! semantics. The first failure stops the bundle; assets uploaded before it
//! stay attached.

use crate::core::error::{HoistError, HostError, HoistResult};
use crate::host::{Release, ReleaseHost};
use crate::matrix::package::StagingBundle;

/// Upload every staged file; returns the uploaded asset names
pub fn publish_assets(host: &dyn ReleaseHost, release: &Release, bundle: &StagingBundle) -> HoistResult<Vec<String>> {
  let mut uploaded = Vec::with_capacity(bundle.files.len());
  log::debug!(
    "uploading {} ({}) to {}",
    bundle.asset_names().join(", "),
    bundle.platform.platform_suffix,
    release.tag
  );

  for file in &bundle.files {
    debug_assert_eq!(
      file.local_path.file_name().map(|n| n.to_string_lossy().to_string()),
      Some(file.asset_name.clone())
    );

    match host.upload_asset(&release.tag, &file.local_path, true) {
      Ok(asset) => {
        log::info!("uploaded {} to {}", asset.name, asset.tag);
        uploaded.push(asset.name);
      }
      Err(err) => {
        return Err(HoistError::Host(HostError::UploadFailed {
          tag: release.tag.clone(),
          asset: file.asset_name.clone(),
          uploaded,
          reason: err.to_string(),
        }));
      }
    }
  }

  Ok(uploaded)
}

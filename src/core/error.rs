//! Error types for cargo-hoist with contextual messages and exit codes
//!
//! Every orchestration stage has its own error category so that a failure is
//! always reported with the platform and stage it came from.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cargo-hoist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (host API, toolchain, I/O)
  System = 2,
  /// Validation failure (unrecognized tags, bad matrix)
  Validation = 3,
  /// Release is live but not every expected asset is attached
  Incomplete = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cargo-hoist
#[derive(Debug)]
pub enum HoistError {
  /// Configuration errors
  Config(ConfigError),

  /// Hosting platform errors (query, publish, upload)
  Host(HostError),

  /// Per-platform build and packaging errors
  Build(BuildError),

  /// One or more platform jobs failed after the release was published
  Run(RunFailure),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl HoistError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    HoistError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    HoistError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      HoistError::Message { message, context, help } => HoistError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      HoistError::Io(err) => HoistError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      HoistError::Config(_) => ExitCode::User,
      HoistError::Host(HostError::UnrecognizedTag { .. }) => ExitCode::Validation,
      HoistError::Host(_) => ExitCode::System,
      HoistError::Build(_) => ExitCode::System,
      HoistError::Run(failure) => {
        if failure.release_incomplete {
          ExitCode::Incomplete
        } else {
          ExitCode::System
        }
      }
      HoistError::Io(_) => ExitCode::System,
      HoistError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      HoistError::Config(e) => e.help_message(),
      HoistError::Host(e) => e.help_message(),
      HoistError::Build(e) => e.help_message(),
      HoistError::Run(e) => e.help_message(),
      HoistError::Message { help, .. } => help.clone(),
      HoistError::Io(_) => None,
    }
  }
}

impl fmt::Display for HoistError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HoistError::Config(e) => write!(f, "{}", e),
      HoistError::Host(e) => write!(f, "{}", e),
      HoistError::Build(e) => write!(f, "{}", e),
      HoistError::Run(e) => write!(f, "{}", e),
      HoistError::Io(e) => write!(f, "I/O error: {}", e),
      HoistError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for HoistError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      HoistError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for HoistError {
  fn from(err: io::Error) -> Self {
    HoistError::Io(err)
  }
}

impl From<String> for HoistError {
  fn from(msg: String) -> Self {
    HoistError::message(msg)
  }
}

impl From<&str> for HoistError {
  fn from(msg: &str) -> Self {
    HoistError::message(msg)
  }
}

impl From<ConfigError> for HoistError {
  fn from(err: ConfigError) -> Self {
    HoistError::Config(err)
  }
}

impl From<HostError> for HoistError {
  fn from(err: HostError) -> Self {
    HoistError::Host(err)
  }
}

impl From<BuildError> for HoistError {
  fn from(err: BuildError) -> Self {
    HoistError::Build(err)
  }
}

impl From<toml_edit::de::Error> for HoistError {
  fn from(err: toml_edit::de::Error) -> Self {
    HoistError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for HoistError {
  fn from(err: toml_edit::ser::Error) -> Self {
    HoistError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for HoistError {
  fn from(err: serde_json::Error) -> Self {
    HoistError::message(format!("JSON error: {}", err))
  }
}

impl From<cargo_metadata::Error> for HoistError {
  fn from(err: cargo_metadata::Error) -> Self {
    HoistError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for HoistError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    HoistError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Convert anyhow::Error to HoistError
impl From<anyhow::Error> for HoistError {
  fn from(err: anyhow::Error) -> Self {
    HoistError::message(err.to_string())
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// hoist.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Platform not present in the matrix
  PlatformNotFound { suffix: String },

  /// Matrix or template is malformed
  Invalid { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `cargo hoist init` to create a configuration file.".to_string()),
      ConfigError::PlatformNotFound { suffix } => Some(format!(
        "List the configured matrix with `cargo hoist plan`. No `[[platforms]]` entry has suffix '{}'.",
        suffix
      )),
      ConfigError::MissingField { .. } | ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No cargo-hoist configuration found.\nExpected file: {}/hoist.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::PlatformNotFound { suffix } => {
        write!(f, "Platform '{}' not found in configuration", suffix)
      }
      ConfigError::Invalid { reason } => {
        write!(f, "Invalid configuration: {}", reason)
      }
    }
  }
}

/// Hosting platform errors
#[derive(Debug)]
pub enum HostError {
  /// Looking up the latest release failed for a reason other than "not found"
  QueryFailed { reason: String },

  /// The latest tag does not follow the `v0.<minor>.0` scheme and fallback is disabled
  UnrecognizedTag { tag: String },

  /// Release creation was rejected
  PublishFailed { tag: String, reason: String },

  /// An asset upload failed; earlier uploads of the same bundle are kept
  UploadFailed {
    tag: String,
    asset: String,
    uploaded: Vec<String>,
    reason: String,
  },

  /// A host command could not be executed at all
  CommandFailed { command: String, stderr: String },
}

impl HostError {
  fn help_message(&self) -> Option<String> {
    match self {
      HostError::QueryFailed { reason } => {
        if reason.contains("auth") || reason.contains("401") || reason.contains("403") {
          Some("Check `gh auth status` or set GH_TOKEN for the release repository.".to_string())
        } else {
          Some("No tag was claimed. Re-run once the hosting platform is reachable.".to_string())
        }
      }
      HostError::UnrecognizedTag { tag } => Some(format!(
        "The latest release '{}' is outside the v0.<minor>.0 scheme. Set `allow_tag_fallback = true` under [release] or pass --allow-tag-fallback to restart at v0.1.0.",
        tag
      )),
      HostError::PublishFailed { .. } => {
        Some("No platform jobs were started. Fix the cause and re-run from the top.".to_string())
      }
      HostError::UploadFailed { .. } => Some(
        "The release is live but incomplete. Re-running uploads with clobber semantics is safe.".to_string(),
      ),
      HostError::CommandFailed { command, .. } if command.starts_with("gh") => {
        Some("Install the GitHub CLI (https://cli.github.com) and run `gh auth login`.".to_string())
      }
      HostError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for HostError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HostError::QueryFailed { reason } => {
        write!(f, "Failed to query the latest release: {}", reason)
      }
      HostError::UnrecognizedTag { tag } => {
        write!(f, "Latest release tag '{}' does not match v0.<minor>.0", tag)
      }
      HostError::PublishFailed { tag, reason } => {
        write!(f, "Failed to publish release {}: {}", tag, reason)
      }
      HostError::UploadFailed {
        tag,
        asset,
        uploaded,
        reason,
      } => {
        write!(f, "Failed to upload '{}' to release {}: {}", asset, tag, reason)?;
        if !uploaded.is_empty() {
          write!(f, "\nAlready uploaded: {}", uploaded.join(", "))?;
        }
        Ok(())
      }
      HostError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}\n{}", command, stderr)
      }
    }
  }
}

/// Platform job errors (build and packaging stages)
#[derive(Debug)]
pub enum BuildError {
  /// The toolchain reported a failure for this target
  ToolchainFailed { target: String, reason: String },

  /// The toolchain succeeded but the expected artifact is missing
  ArtifactMissing { target: String, path: PathBuf },

  /// Assembling the staging bundle failed
  PackagingFailed { platform: String, reason: String },
}

impl BuildError {
  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::ToolchainFailed { target, .. } => Some(format!(
        "Make sure the target is installed (`rustup target add {}`) along with its system dependencies.",
        target
      )),
      BuildError::ArtifactMissing { .. } => {
        Some("Check that `[project].bin` matches a binary target of the package.".to_string())
      }
      BuildError::PackagingFailed { .. } => None,
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ToolchainFailed { target, reason } => {
        write!(f, "Build failed for target {}: {}", target, reason)
      }
      BuildError::ArtifactMissing { target, path } => {
        write!(f, "Build for {} produced no artifact at {}", target, path.display())
      }
      BuildError::PackagingFailed { platform, reason } => {
        write!(f, "Packaging failed for {}: {}", platform, reason)
      }
    }
  }
}

/// Summary of a run whose gate succeeded but where platform jobs failed
#[derive(Debug)]
pub struct RunFailure {
  /// Release tag the run published (or would have published)
  pub tag: Option<String>,
  /// `platform: stage: reason` lines, one per failed job
  pub failures: Vec<String>,
  /// Whether the release is live without its full asset set
  pub release_incomplete: bool,
}

impl RunFailure {
  fn help_message(&self) -> Option<String> {
    if self.release_incomplete {
      Some("Re-trigger the run; the existing release is reused and assets are re-uploaded.".to_string())
    } else {
      None
    }
  }
}

impl fmt::Display for RunFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.tag {
      Some(tag) => write!(f, "{} platform job(s) failed for release {}", self.failures.len(), tag)?,
      None => write!(f, "{} platform job(s) failed", self.failures.len())?,
    }
    for failure in &self.failures {
      write!(f, "\n  - {}", failure)?;
    }
    Ok(())
  }
}

/// Result type alias for cargo-hoist
pub type HoistResult<T> = Result<T, HoistError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> HoistResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> HoistResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<HoistError>,
{
  fn context(self, ctx: impl Into<String>) -> HoistResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> HoistResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &HoistError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

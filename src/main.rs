mod commands;
mod core;
mod host;
mod matrix;
mod release;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{HoistError, print_error};
use release::RunEvent;
use std::path::PathBuf;

/// Cut versioned releases and attach per-platform binaries
#[derive(Parser)]
#[command(name = "cargo")]
#[command(bin_name = "cargo")]
#[command(styles = get_styles())]
enum CargoCli {
  Hoist(HoistCli),
}

#[derive(Parser)]
#[command(name = "hoist")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct HoistCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Setup & Inspection
  // ============================================================================
  /// Write a hoist.toml with a default platform matrix
  Init {
    /// Binary target to release (default: first bin of the root package)
    #[arg(long)]
    bin: Option<String>,
    /// Application icon; enables the desktop entry for linux
    #[arg(long)]
    icon: Option<PathBuf>,
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  /// Show the job graph and the assets each platform attaches
  Plan {
    /// Output format: text (default), json, dot
    #[arg(long, default_value = "text")]
    format: String,
  },

  /// Compute the tag the next release would claim
  NextTag {
    /// Compute offline from this tag instead of querying the host
    #[arg(long, conflicts_with = "no_prior")]
    latest: Option<String>,
    /// Compute offline as if no release existed yet
    #[arg(long)]
    no_prior: bool,
    /// Continue from v0.1.0 when the latest tag is not v0.<minor>.0
    #[arg(long)]
    allow_tag_fallback: bool,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Release workflow
  // ============================================================================
  /// Build and stage one platform locally (no uploads)
  Package {
    /// Platform suffix from the matrix
    platform: String,
    /// Use this prebuilt binary instead of running cargo build
    #[arg(long)]
    binary: Option<PathBuf>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run the release workflow: publish, build, package, upload, verify
  Run {
    /// Trigger event
    #[arg(long, value_enum, default_value = "publish")]
    event: RunEvent,
    /// Commit to release (default: HEAD)
    #[arg(long)]
    commit: Option<String>,
    /// Only run these platforms (repeatable)
    #[arg(long = "platform")]
    platforms: Vec<String>,
    /// Continue from v0.1.0 when the latest tag is not v0.<minor>.0
    #[arg(long)]
    allow_tag_fallback: bool,
    /// Print the run record as JSON
    #[arg(long)]
    json: bool,
    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,
  },

  /// Check that a release carries every expected asset
  Verify {
    /// Release tag (default: tag of the last recorded run)
    tag: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    .format_timestamp(None)
    .init();

  let CargoCli::Hoist(cli) = CargoCli::parse();

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match core::context::WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    // A broken hoist.toml must not stop `init --force` from replacing it
    Err(e) if matches!(cli.command, Commands::Init { force: true, .. }) => {
      log::warn!("ignoring invalid configuration: {}", e);
      core::context::WorkspaceContext {
        root: workspace_root.clone(),
        config: None,
      }
    }
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Init { bin, icon, force } => commands::run_init(&ctx, bin, icon, force),
    Commands::Plan { format } => commands::run_plan(&ctx, &format),
    Commands::NextTag {
      latest,
      no_prior,
      allow_tag_fallback,
      json,
    } => commands::run_next_tag(&ctx, latest, no_prior, allow_tag_fallback, json),
    Commands::Package { platform, binary, json } => commands::run_package(&ctx, &platform, binary, json),
    Commands::Run {
      event,
      commit,
      platforms,
      allow_tag_fallback,
      json,
      no_progress,
    } => commands::run_release(&ctx, event, commit, platforms, allow_tag_fallback, json, no_progress),
    Commands::Verify { tag, json } => commands::run_verify(&ctx, tag, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: HoistError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

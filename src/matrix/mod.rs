//! Per-platform jobs: build, package, upload
//!
//! - **graph**: gate -> platform job graph
//! - **build**: toolchain seam and the cargo-backed default
//! - **package**: staging bundles and desktop-entry descriptors
//! - **upload**: clobber uploads to the published release

pub mod build;
pub mod graph;
pub mod package;
pub mod upload;

pub use build::{BuildToolchain, CargoToolchain, build_platform};
pub use graph::JobGraph;
pub use package::Packager;
pub use upload::publish_assets;

//! Core engine for cargo-hoist
//!
//! - **config**: hoist.toml parsing and validation
//! - **context**: workspace context shared by every command
//! - **error**: error types with exit codes and contextual help
//! - **run**: release run orchestration (gate, fan-out, verification)
//! - **vcs**: commit resolution through the system git binary

pub mod config;
pub mod context;
pub mod error;
pub mod run;
pub mod vcs;

//! Release gate: decide the tag, publish the release, track its lifecycle
//!
//! # Invariants
//!
//! 1. **Tags only move forward** - `v0.<minor>.0` with a strictly increasing
//!    minor; an unrecognized latest tag is never silently reset.
//! 2. **One release per run** - created directly in published state, or
//!    reused when the same commit already claimed the tag.
//! 3. **No rollback** - a release whose uploads failed stays live and is
//!    reported as `PublishedIncomplete`.

pub mod publish;
pub mod state;
pub mod tag;

pub use publish::{PublishOutcome, publish_release};
pub use state::{JobStatus, PlatformOutcome, ReleaseState, RunEvent, RunRecord, Stage};
pub use tag::{NextTag, ReleaseTag, TagSource, next_tag, resolve_next_tag};

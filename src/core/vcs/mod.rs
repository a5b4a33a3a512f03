pub mod system_git;

pub use system_git::{SystemGit, is_valid_sha};

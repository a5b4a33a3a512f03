//! Command implementations

pub mod init;
pub mod next_tag;
pub mod package;
pub mod plan;
pub mod run;
pub mod verify;

pub use init::run_init;
pub use next_tag::run_next_tag;
pub use package::run_package;
pub use plan::run_plan;
pub use run::run_release;
pub use verify::run_verify;

pub mod progress;

pub use progress::MatrixProgress;

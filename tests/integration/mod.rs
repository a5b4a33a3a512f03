//! Integration tests driving the compiled `cargo-hoist` binary

mod helpers;
mod test_init;
mod test_next_tag;
mod test_package;
mod test_plan;

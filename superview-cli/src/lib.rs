// superview-cli/src/lib.rs
//
// Library portion of the Superview CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod progress;
pub mod signals;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::encode::{create_core_config, run_encode};

//! CLI command handlers.
//!
//! Testable command handlers invoked by main.rs. Each handler implements the
//! business logic for one subcommand.

mod clean;
mod generate;

pub use clean::{run_clean, CleanConfig};
pub use generate::{run_generate, GenerateConfig};

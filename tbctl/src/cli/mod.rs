//! CLI argument parsing and command execution.

mod args;
mod commands;
mod console;

pub use args::Cli;
pub use commands::execute;

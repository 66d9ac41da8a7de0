//! CLI module
//!
//! Command-line interface for the pager. There are no subcommands: running
//! `event-pager` with no arguments walks the built-in query with default
//! settings. Flags only tune delays, retries, timeout and logging.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::{run_query, Runner};

//! CLI module
//!
//! Command-line interface for paging through data files.
//!
//! # Commands
//!
//! - `browse` - Simulate a scrolling list over a JSON or DuckDB file
//! - `validate` - Check a pager configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

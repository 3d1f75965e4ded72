//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scroll pager CLI
#[derive(Parser, Debug)]
#[command(name = "scroll-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a data file the way a scrolling list would
    Browse {
        /// Data file: a JSON array of records, or a DuckDB database
        #[arg(short, long)]
        source: PathBuf,

        /// Table to read (DuckDB sources only)
        #[arg(short, long)]
        table: Option<String>,

        /// Items per fetch (overrides the config file)
        #[arg(long)]
        page_size: Option<usize>,

        /// Sort key as `field` or `field:asc|desc` (repeatable)
        #[arg(long = "sort")]
        sort: Vec<String>,

        /// Filter as `field<op>value`, ops: = != > >= < <= ~ (repeatable, ANDed)
        #[arg(long = "filter")]
        filter: Vec<String>,

        /// Load more when an item within this many of the end appears
        #[arg(long, default_value = "5")]
        threshold: usize,

        /// Stop after this many items have been shown
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Validate a pager configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

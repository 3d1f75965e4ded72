// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Scroll Pager
//!
//! Incremental, scroll-driven pagination over sorted and filtered data.
//! A pager loads a list page by page as the user scrolls, with exactly one
//! fetch in flight, and publishes read-only snapshots for rendering.
//!
//! ## Features
//!
//! - **Single-flight loading**: repeated triggers never start a second fetch
//! - **Drift-safe commits**: results are dropped when the list was reset or
//!   moved while a fetch was running
//! - **Retry from the failed offset**: errors keep everything already loaded
//! - **Scroll triggers**: last item, threshold, or custom predicates
//! - **Pluggable sources**: in-memory records or DuckDB tables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scroll_pager::{MemorySource, Pager, PagerConfig, SortKey, Trigger};
//!
//! #[tokio::main]
//! async fn main() -> scroll_pager::Result<()> {
//!     let source = MemorySource::new((1..=100).collect::<Vec<u32>>());
//!     let config = PagerConfig::new().with_page_size(20);
//!     let pager = Pager::spawn(source, &config)?;
//!
//!     // The list became visible
//!     pager.attach()?;
//!     let snapshot = pager.settled().await?;
//!
//!     // A row was rendered
//!     let trigger = Trigger::threshold(5);
//!     pager.on_appear(&snapshot.items[17], &trigger)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Pager handle                          │
//! │  attach()  load_more()  reset()  retry()  on_appear(item)    │
//! │  snapshot()  changed()  settled()                            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ commands
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Pager task (owns Controller)                 │
//! │  Idle ─▶ Fetching ─▶ Idle | AllLoaded | Error                │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ count + fetch
//! ┌───────────────┬──────────────────────────┬───────────────────┐
//! │  DataSource   │      MemorySource        │   DuckDbSource    │
//! │  (trait)      │  serde_json evaluation   │  SQL WHERE/ORDER  │
//! └───────────────┴──────────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Pager message sinks
pub mod logging;

/// Sort and filter criteria
pub mod query;

/// Data sources the pager reads from
pub mod source;

/// Pagination state machine
pub mod controller;

/// Pager runtime and handles
pub mod pager;

/// Scroll triggers
pub mod triggers;

/// Pager configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, ResultExt};

pub use config::PagerConfig;
pub use controller::{PagerStats, PaginationState};
pub use logging::{LogMode, LogSink, Logger};
pub use pager::{Pager, Snapshot};
pub use query::{FetchDescriptor, Filter, SortDirection, SortKey};
pub use source::{DataSource, DuckDbSource, MemorySource};
pub use triggers::{LoadTarget, Trigger};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

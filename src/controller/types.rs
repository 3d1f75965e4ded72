//! Controller types
//!
//! Lifecycle state, fetch tickets, and counters for the pagination controller.

use crate::error::Error;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a pager
///
/// Exactly one case holds at a time. Transitions are made only by the
/// controller: `Fetching` is entered from `Idle`, `AllLoaded` and `Error`
/// from `Fetching`.
#[derive(Debug, Clone, Default)]
pub enum PaginationState {
    /// No fetch running; more data may exist
    #[default]
    Idle,
    /// One fetch in flight
    Fetching,
    /// Every matching record has been loaded
    AllLoaded,
    /// The last fetch failed; waits for `retry`
    Error(Arc<Error>),
}

impl PaginationState {
    /// Check if no fetch is running and more data may exist
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }

    /// Check if the end of the data was reached
    pub fn is_all_loaded(&self) -> bool {
        matches!(self, Self::AllLoaded)
    }

    /// Check if the last fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Failure cause, if any
    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            Self::Error(cause) => Some(cause),
            _ => None,
        }
    }

    /// Whether `load_more` would start a fetch
    pub fn is_loadable(&self) -> bool {
        self.is_idle()
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::AllLoaded => "all_loaded",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for PaginationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(cause) => write!(f, "error({cause})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Ticket for one dispatched fetch
///
/// Carries what the controller expected when the fetch started. A completion
/// is only committed if these still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Controller generation at dispatch; bumped by every reset
    pub generation: u64,
    /// Offset the fetch starts from
    pub offset: usize,
    /// Items already accumulated at dispatch
    pub accumulated: usize,
    /// Maximum items to fetch
    pub page_size: usize,
}

/// Result of a successful page fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage<T> {
    /// Newly fetched items, in sort order
    pub items: Vec<T>,
    /// Matching record count reported by the data source
    pub total: usize,
}

/// What a completion did to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Items appended; state is now `Idle` or `AllLoaded`
    Applied,
    /// The fetch failed; state is now `Error`
    Failed,
    /// The completion was stale and ignored
    Discarded,
}

/// Counters kept across the life of a pager
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerStats {
    /// Fetches dispatched
    pub fetches_started: usize,
    /// Successful pages committed
    pub pages_applied: usize,
    /// Items appended across all pages
    pub items_loaded: usize,
    /// Failed fetches
    pub failures: usize,
    /// Stale completions dropped
    pub discarded: usize,
    /// Resets performed
    pub resets: usize,
}

impl PagerStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatched fetch
    pub fn add_fetch(&mut self) {
        self.fetches_started += 1;
    }

    /// Record an applied page
    pub fn add_page(&mut self, items: usize) {
        self.pages_applied += 1;
        self.items_loaded += items;
    }

    /// Record a failure
    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Record a discarded completion
    pub fn add_discarded(&mut self) {
        self.discarded += 1;
    }

    /// Record a reset
    pub fn add_reset(&mut self) {
        self.resets += 1;
    }
}

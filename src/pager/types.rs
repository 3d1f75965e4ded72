//! Pager types
//!
//! Read-only snapshots published to observers and the commands sent to the
//! pager task.

use crate::controller::{FetchRequest, FetchedPage, PagerStats, PaginationState};
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Read-only view of a pager at one point in time
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Accumulated items
    pub items: Arc<Vec<T>>,
    /// Offset of the next page
    pub offset: usize,
    /// Lifecycle state
    pub state: PaginationState,
    /// Last total reported by the data source
    pub total: Option<usize>,
    /// Counters
    pub stats: PagerStats,
    /// Change counter
    pub version: u64,
}

impl<T> Snapshot<T> {
    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items are loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        self.state.is_fetching()
    }

    /// Check if the end of the data was reached
    pub fn is_all_loaded(&self) -> bool {
        self.state.is_all_loaded()
    }

    /// Failure cause of the last fetch, if it failed
    pub fn error(&self) -> Option<Arc<Error>> {
        self.state.error().cloned()
    }

    /// Whether a `load_more` would start a fetch
    pub fn is_loadable(&self) -> bool {
        self.state.is_loadable()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            offset: self.offset,
            state: self.state.clone(),
            total: self.total,
            stats: self.stats.clone(),
            version: self.version,
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            offset: 0,
            state: PaginationState::Idle,
            total: None,
            stats: PagerStats::default(),
            version: 0,
        }
    }
}

/// Message sent from a handle to the pager task
#[derive(Debug)]
pub(crate) enum Command {
    LoadMore,
    Reset,
    Retry,
    Attach,
    /// Replies once every earlier command was handled
    Flush(oneshot::Sender<()>),
}

/// Finished fetch returned to the pager task
pub(crate) type Completion<T> = (FetchRequest, Result<FetchedPage<T>>);

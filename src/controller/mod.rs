//! Pagination controller module
//!
//! The state machine behind every pager. It owns the accumulated items, the
//! fetch offset, and the lifecycle state, and decides when a fetch may start
//! and whether a finished fetch may be committed.
//!
//! # Overview
//!
//! The controller is synchronous. Operations that may start a fetch
//! (`load_more`, `reset`, `retry`, `attach`) return a [`FetchRequest`]
//! ticket; the caller runs [`fetch_page`] for it and hands the outcome back
//! through [`Controller::complete`]. The pager task in `crate::pager` is that
//! caller.
//!
//! ```text
//!            load_more              ok, more left
//!   Idle ───────────────▶ Fetching ───────────────▶ Idle
//!    ▲                      │  │
//!    │ retry          error │  │ ok, end reached
//!    │                      ▼  ▼
//!    └──────────────── Error   AllLoaded
//!
//!   reset: any state ──▶ Idle (cleared) ──▶ load_more
//! ```

mod types;

pub use types::{Commit, FetchRequest, FetchedPage, PagerStats, PaginationState};

use crate::error::Result;
use crate::logging::Logger;
use crate::query::FetchDescriptor;
use crate::source::DataSource;
use std::sync::Arc;

/// Pagination state machine
#[derive(Debug)]
pub struct Controller<T> {
    /// Accumulated items, append-only until reset
    ///
    /// Published snapshots share this vector, so each applied page builds a
    /// new one: a page costs O(accumulated) clones.
    items: Arc<Vec<T>>,
    /// Offset of the next page
    offset: usize,
    /// Lifecycle state
    state: PaginationState,
    /// Bumped by every reset; stale tickets carry an older value
    generation: u64,
    /// Bumped by every observable change
    version: u64,
    /// Last total reported by the data source
    total: Option<usize>,
    /// Maximum items per fetch
    page_size: usize,
    /// Sort and filter criteria
    descriptor: Arc<FetchDescriptor>,
    /// Message sink
    logger: Logger,
    /// Counters
    stats: PagerStats,
}

impl<T: Clone> Controller<T> {
    /// Create an idle controller with no items
    pub fn new(page_size: usize, descriptor: FetchDescriptor, logger: Logger) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            offset: 0,
            state: PaginationState::Idle,
            generation: 0,
            version: 0,
            total: None,
            page_size: page_size.max(1),
            descriptor: Arc::new(descriptor),
            logger,
            stats: PagerStats::new(),
        }
    }

    /// Accumulated items
    pub fn items(&self) -> &Arc<Vec<T>> {
        &self.items
    }

    /// Offset of the next page
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Last total reported by the data source
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Items requested per fetch
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Sort and filter criteria
    pub fn descriptor(&self) -> &Arc<FetchDescriptor> {
        &self.descriptor
    }

    /// Current reset generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change counter; differs whenever anything observable changed
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Counters
    pub fn stats(&self) -> &PagerStats {
        &self.stats
    }

    /// Logger shared with fetch tasks
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Start a fetch at the current offset if the state allows it
    ///
    /// Returns `None` (and logs why) when all data is loaded, a fetch is
    /// already in flight, or the last fetch failed.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        match &self.state {
            PaginationState::AllLoaded => {
                self.logger.log(|| "load_more skipped: all items loaded".to_string());
                return None;
            }
            PaginationState::Fetching => {
                self.logger
                    .log(|| "load_more skipped: fetch already in flight".to_string());
                return None;
            }
            PaginationState::Error(_) => {
                self.logger
                    .log(|| "load_more skipped: last fetch failed, call retry".to_string());
                return None;
            }
            PaginationState::Idle => {}
        }

        self.state = PaginationState::Fetching;
        self.version += 1;
        self.stats.add_fetch();

        let request = FetchRequest {
            generation: self.generation,
            offset: self.offset,
            accumulated: self.items.len(),
            page_size: self.page_size,
        };
        self.logger.log(|| {
            format!(
                "Fetching up to {} items at offset {} (generation {})",
                request.page_size, request.offset, request.generation
            )
        });
        Some(request)
    }

    /// Clear all data and start over from offset 0
    ///
    /// Always permitted. A fetch still in flight finishes but its result is
    /// discarded because its generation no longer matches.
    pub fn reset(&mut self) -> Option<FetchRequest> {
        let in_flight = self.state.is_fetching();
        self.items = Arc::new(Vec::new());
        self.offset = 0;
        self.total = None;
        self.state = PaginationState::Idle;
        self.generation += 1;
        self.version += 1;
        self.stats.add_reset();

        self.logger.log(|| {
            if in_flight {
                format!(
                    "Reset to generation {}; in-flight fetch will be discarded",
                    self.generation
                )
            } else {
                format!("Reset to generation {}", self.generation)
            }
        });

        self.load_more()
    }

    /// Leave the error state and try the same offset again
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if !self.state.is_error() {
            let state = self.state.name();
            self.logger
                .log(|| format!("retry skipped: state is {state}, not error"));
            return None;
        }

        self.state = PaginationState::Idle;
        self.version += 1;
        self.logger
            .log(|| format!("Retrying from offset {}", self.offset));
        self.load_more()
    }

    /// Auto-start hook; loads the first page only when nothing was loaded yet
    ///
    /// Safe to call any number of times.
    pub fn attach(&mut self) -> Option<FetchRequest> {
        if self.offset == 0 && self.items.is_empty() && self.state.is_idle() {
            self.load_more()
        } else {
            None
        }
    }

    /// Commit the outcome of a fetch started by `request`
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        outcome: Result<FetchedPage<T>>,
    ) -> Commit {
        if let Some(reason) = self.drift(request) {
            self.stats.add_discarded();
            self.version += 1;
            self.logger.log(|| {
                format!(
                    "Discarding completion for offset {} (generation {}): {reason}",
                    request.offset, request.generation
                )
            });
            return Commit::Discarded;
        }

        self.version += 1;

        match outcome {
            Ok(page) => {
                let fetched = page.items.len();
                self.items = Arc::new(appended(&self.items, page.items));
                self.offset += fetched;
                self.total = Some(page.total);
                self.stats.add_page(fetched);

                let accumulated = self.items.len();
                self.state = if accumulated >= page.total || (fetched == 0 && accumulated > 0) {
                    PaginationState::AllLoaded
                } else {
                    PaginationState::Idle
                };

                self.logger.log(|| {
                    format!(
                        "Fetched {fetched} items ({accumulated}/{} loaded), now {}",
                        page.total,
                        self.state.name()
                    )
                });
                Commit::Applied
            }
            Err(e) => {
                self.stats.add_failure();
                self.logger
                    .error(|| format!("Fetch at offset {} failed: {e}", request.offset));
                self.state = PaginationState::Error(Arc::new(e));
                Commit::Failed
            }
        }
    }

    /// Why a completion no longer applies, if it doesn't
    fn drift(&self, request: &FetchRequest) -> Option<&'static str> {
        if request.generation != self.generation {
            Some("controller was reset")
        } else if !self.state.is_fetching() {
            Some("no fetch is in flight")
        } else if request.offset != self.offset || request.accumulated != self.items.len() {
            Some("offset moved since dispatch")
        } else {
            None
        }
    }
}

/// Previously loaded items followed by a fetched page
fn appended<T: Clone>(loaded: &[T], page: Vec<T>) -> Vec<T> {
    let mut items = Vec::with_capacity(loaded.len() + page.len());
    items.extend_from_slice(loaded);
    items.extend(page);
    items
}

/// Run one page fetch for a ticket
///
/// Counts matching records, then fetches up to `page_size` of them starting at
/// the ticket's offset clamped to `min(total, accumulated)`. The clamp keeps
/// the start inside the live data when records were removed behind the pager.
pub async fn fetch_page<T>(
    source: &dyn DataSource<T>,
    descriptor: &FetchDescriptor,
    request: &FetchRequest,
) -> Result<FetchedPage<T>> {
    let total = source.count(descriptor).await?;
    let start = request.offset.min(total.min(request.accumulated));
    let items = source.fetch(descriptor, start, request.page_size).await?;
    Ok(FetchedPage { items, total })
}

#[cfg(test)]
mod tests;

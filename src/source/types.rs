//! Data source trait

use crate::error::Result;
use crate::query::FetchDescriptor;
use async_trait::async_trait;

/// Paged record store queried by a pager
///
/// Both calls may fail with any error; the pager treats every failure as an
/// opaque fetch failure.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    /// Count records matching the descriptor's filter
    async fn count(&self, descriptor: &FetchDescriptor) -> Result<usize>;

    /// Fetch up to `limit` matching records, sorted, starting at `offset`
    async fn fetch(
        &self,
        descriptor: &FetchDescriptor,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<T>>;
}

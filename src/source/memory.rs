//! In-memory data source
//!
//! Holds records in a shared vector. Clones share the same storage, so a test
//! or a producer can mutate the data while a pager is reading it.

use super::types::DataSource;
use crate::error::{Error, Result};
use crate::query::{eval, FetchDescriptor};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Data source over an in-memory record list
#[derive(Debug)]
pub struct MemorySource<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for MemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> MemorySource<T> {
    /// Create a source with the given records
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Append a record
    pub async fn push(&self, record: T) {
        self.records.write().await.push(record);
    }

    /// Append several records
    pub async fn extend(&self, records: impl IntoIterator<Item = T>) {
        self.records.write().await.extend(records);
    }

    /// Keep only records matching the predicate
    pub async fn retain(&self, keep: impl FnMut(&T) -> bool) {
        self.records.write().await.retain(keep);
    }

    /// Remove all records
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Total number of stored records, ignoring any filter
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the source holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T: Serialize> MemorySource<T> {
    /// Indices of matching records in sort order
    fn select(records: &[T], descriptor: &FetchDescriptor) -> Result<Vec<usize>> {
        let mut rows: Vec<(usize, Value)> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let value = serde_json::to_value(record)
                .map_err(|e| Error::decode(format!("Record cannot be serialized: {e}")))?;
            let keep = descriptor
                .filter
                .as_ref()
                .map_or(true, |filter| eval::matches(filter, &value));
            if keep {
                rows.push((index, value));
            }
        }

        if !descriptor.sort.is_empty() {
            // Stable, so insertion order breaks ties
            rows.sort_by(|(_, a), (_, b)| eval::compare_records(a, b, &descriptor.sort));
        }

        Ok(rows.into_iter().map(|(index, _)| index).collect())
    }
}

#[async_trait]
impl<T> DataSource<T> for MemorySource<T>
where
    T: Serialize + Clone + Send + Sync,
{
    async fn count(&self, descriptor: &FetchDescriptor) -> Result<usize> {
        let records = self.records.read().await;
        if descriptor.filter.is_none() {
            return Ok(records.len());
        }
        Ok(Self::select(&records, descriptor)?.len())
    }

    async fn fetch(
        &self,
        descriptor: &FetchDescriptor,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<T>> {
        let records = self.records.read().await;
        let selected = Self::select(&records, descriptor)?;
        Ok(selected
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|index| records[index].clone())
            .collect())
    }
}

//! Data source module
//!
//! Pagers read through the [`DataSource`] trait: a filtered count plus a
//! sorted `offset/limit` fetch.
//!
//! # Overview
//!
//! - `DataSource` - async trait implemented by every record store
//! - `MemorySource` - shared in-memory vector, mutable while paging
//! - `DuckDbSource` - a DuckDB table queried with generated SQL

mod duckdb_source;
mod memory;
mod types;

pub use duckdb_source::DuckDbSource;
pub use memory::MemorySource;
pub use types::DataSource;

#[cfg(test)]
mod tests;

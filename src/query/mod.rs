//! Query criteria module
//!
//! Sort and filter criteria are plain data so the same descriptor can be
//! evaluated in memory against JSON records or rendered to SQL.
//!
//! # Overview
//!
//! - `FetchDescriptor` - filter plus sort keys, fixed per pager
//! - `eval` - in-memory matching and ordering over `serde_json::Value`
//! - `sql` - `WHERE` / `ORDER BY` rendering for DuckDB
//! - `parser` - compact text syntax used on the command line

pub mod eval;
mod parser;
pub mod sql;
mod types;

pub use parser::{parse_filter, parse_filters, parse_sort_key};
pub use types::{FetchDescriptor, Filter, SortDirection, SortKey};

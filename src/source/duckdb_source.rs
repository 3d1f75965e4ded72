//! DuckDB-backed data source
//!
//! Pages through a single table or view. Counts and pages are plain SQL
//! (`COUNT(*)`, `LIMIT/OFFSET`) with the descriptor rendered into `WHERE` and
//! `ORDER BY` clauses. Rows are decoded into JSON objects and then into `T`.

use super::types::DataSource;
use crate::error::{Error, Result};
use crate::query::{sql, FetchDescriptor};
use async_trait::async_trait;
use duckdb::Connection;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Data source over a DuckDB table
pub struct DuckDbSource<T> {
    /// Shared connection; DuckDB calls run on the blocking pool
    conn: Arc<Mutex<Connection>>,
    /// Table or view name (may be schema-qualified)
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for DuckDbSource<T> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> DuckDbSource<T> {
    /// Wrap an existing connection
    pub fn new(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.into(),
            _record: PhantomData,
        }
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory(table: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self::new(conn, table))
    }

    /// Open a database file
    pub fn open(path: impl AsRef<Path>, table: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::config(format!("Failed to open DuckDB database: {e}")))?;
        Ok(Self::new(conn, table))
    }

    /// Table this source reads from
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Run setup or mutation statements against the shared connection
    pub fn execute_batch(&self, statements: &str) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(statements)?;
        Ok(())
    }

    /// SQL for the filtered row count
    pub fn count_sql(&self, descriptor: &FetchDescriptor) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            sql::quote_ident(&self.table),
            sql::where_clause(descriptor.filter.as_ref())
        )
    }

    /// SQL for one page of rows
    pub fn page_sql(&self, descriptor: &FetchDescriptor, offset: usize, limit: usize) -> String {
        format!(
            "SELECT * FROM {}{}{} LIMIT {limit} OFFSET {offset}",
            sql::quote_ident(&self.table),
            sql::where_clause(descriptor.filter.as_ref()),
            sql::order_by_clause(&descriptor.sort)
        )
    }
}

#[async_trait]
impl<T> DataSource<T> for DuckDbSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn count(&self, descriptor: &FetchDescriptor) -> Result<usize> {
        let query = self.count_sql(descriptor);
        let conn = Arc::clone(&self.conn);

        run_blocking(move || {
            let conn = lock(&conn)?;
            tracing::debug!("Executing count query: {}", query);
            let count: i64 = conn.query_row(&query, [], |row| row.get(0))?;
            Ok(count.max(0) as usize)
        })
        .await
    }

    async fn fetch(
        &self,
        descriptor: &FetchDescriptor,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<T>> {
        let query = self.page_sql(descriptor, offset, limit);
        let conn = Arc::clone(&self.conn);

        let rows = run_blocking(move || {
            let conn = lock(&conn)?;
            tracing::debug!("Executing page query: {}", query);
            query_json_rows(&conn, &query)
        })
        .await?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| Error::decode(format!("Row does not match record type: {e}")))
            })
            .collect()
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| Error::data_source("DuckDB connection lock poisoned"))
}

async fn run_blocking<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::data_source(format!("Query task failed: {e}")))?
}

/// Execute a query and convert each row into a JSON object keyed by column
fn query_json_rows(conn: &Connection, query: &str) -> Result<Vec<Value>> {
    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;

    let columns: Vec<String> = rows
        .as_ref()
        .map(|stmt| stmt.column_names())
        .unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            let value: duckdb::types::Value = row.get(index)?;
            object.insert(name.clone(), duckdb_value_to_json(value));
        }
        out.push(Value::Object(object));
    }
    Ok(out)
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Scale a DuckDB temporal value to nanoseconds
fn to_nanos(unit: duckdb::types::TimeUnit, value: i64) -> i128 {
    let scale: i128 = match unit {
        duckdb::types::TimeUnit::Second => NANOS_PER_SEC,
        duckdb::types::TimeUnit::Millisecond => 1_000_000,
        duckdb::types::TimeUnit::Microsecond => 1_000,
        duckdb::types::TimeUnit::Nanosecond => 1,
    };
    i128::from(value) * scale
}

/// Convert DuckDB Value to JSON Value
fn duckdb_value_to_json(value: duckdb::types::Value) -> Value {
    match value {
        duckdb::types::Value::Null => Value::Null,
        duckdb::types::Value::Boolean(b) => Value::Bool(b),
        duckdb::types::Value::TinyInt(i) => Value::Number(i.into()),
        duckdb::types::Value::SmallInt(i) => Value::Number(i.into()),
        duckdb::types::Value::Int(i) => Value::Number(i.into()),
        duckdb::types::Value::BigInt(i) => Value::Number(i.into()),
        duckdb::types::Value::HugeInt(i) => Value::String(i.to_string()),
        duckdb::types::Value::UTinyInt(i) => Value::Number(i.into()),
        duckdb::types::Value::USmallInt(i) => Value::Number(i.into()),
        duckdb::types::Value::UInt(i) => Value::Number(i.into()),
        duckdb::types::Value::UBigInt(i) => Value::Number(i.into()),
        duckdb::types::Value::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number)
        }
        duckdb::types::Value::Double(f) => {
            serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
        }
        duckdb::types::Value::Text(s) => Value::String(s),
        duckdb::types::Value::Blob(b) => Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        duckdb::types::Value::Timestamp(unit, i) => {
            let nanos = to_nanos(unit, i);
            i64::try_from(nanos.div_euclid(NANOS_PER_SEC))
                .ok()
                .and_then(|secs| {
                    chrono::DateTime::from_timestamp(secs, nanos.rem_euclid(NANOS_PER_SEC) as u32)
                })
                .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(Value::Number(i.into()))
        }
        duckdb::types::Value::Date32(d) => {
            // Days since epoch (719163 is the number of days from 1 CE to 1970-01-01)
            chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Number(d.into()))
        }
        duckdb::types::Value::Time64(unit, t) => {
            // Since midnight
            let micros = to_nanos(unit, t).div_euclid(1_000);
            let secs = micros / 1_000_000;
            Value::String(format!(
                "{:02}:{:02}:{:02}.{:06}",
                secs / 3600,
                (secs % 3600) / 60,
                secs % 60,
                micros % 1_000_000
            ))
        }
        duckdb::types::Value::List(items) => {
            Value::Array(items.into_iter().map(duckdb_value_to_json).collect())
        }
        other => Value::String(format!("{other:?}")),
    }
}

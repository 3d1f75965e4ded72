//! SQL rendering of query criteria
//!
//! Produces DuckDB-flavoured `WHERE` and `ORDER BY` fragments. Identifiers are
//! double-quoted and literals single-quoted with embedded quotes doubled.

use super::types::{Filter, SortDirection, SortKey};
use serde_json::Value;

/// Quote an identifier, splitting dot paths into struct field access
pub fn quote_ident(field: &str) -> String {
    field
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a JSON value as a SQL literal
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_str(s),
        other => quote_str(&other.to_string()),
    }
}

fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render a filter as a boolean SQL expression
pub fn render_filter(filter: &Filter) -> String {
    match filter {
        Filter::Eq { field, value } if value.is_null() => format!("{} IS NULL", quote_ident(field)),
        Filter::Ne { field, value } if value.is_null() => {
            format!("{} IS NOT NULL", quote_ident(field))
        }
        Filter::Eq { field, value } => format!("{} = {}", quote_ident(field), literal(value)),
        Filter::Ne { field, value } => {
            format!("{} IS DISTINCT FROM {}", quote_ident(field), literal(value))
        }
        Filter::Gt { field, value } => format!("{} > {}", quote_ident(field), literal(value)),
        Filter::Gte { field, value } => format!("{} >= {}", quote_ident(field), literal(value)),
        Filter::Lt { field, value } => format!("{} < {}", quote_ident(field), literal(value)),
        Filter::Lte { field, value } => format!("{} <= {}", quote_ident(field), literal(value)),
        Filter::Contains { field, value } => format!(
            "contains(CAST({} AS VARCHAR), {})",
            quote_ident(field),
            quote_str(value)
        ),
        Filter::IsNull { field } => format!("{} IS NULL", quote_ident(field)),
        Filter::And { filters } => join(filters, " AND ", "TRUE"),
        Filter::Or { filters } => join(filters, " OR ", "FALSE"),
        Filter::Not { filter } => format!("NOT ({})", render_filter(filter)),
    }
}

fn join(filters: &[Filter], separator: &str, empty: &str) -> String {
    if filters.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = filters
        .iter()
        .map(|f| format!("({})", render_filter(f)))
        .collect();
    parts.join(separator)
}

/// Render an optional filter as a ` WHERE ...` clause (empty when `None`)
pub fn where_clause(filter: Option<&Filter>) -> String {
    filter
        .map(|f| format!(" WHERE {}", render_filter(f)))
        .unwrap_or_default()
}

/// Render sort keys as an ` ORDER BY ...` clause (empty when no keys)
///
/// Nulls sort lowest in both directions, matching in-memory evaluation.
pub fn order_by_clause(keys: &[SortKey]) -> String {
    if keys.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = keys
        .iter()
        .map(|key| {
            let nulls = match key.direction {
                SortDirection::Asc => "NULLS FIRST",
                SortDirection::Desc => "NULLS LAST",
            };
            format!(
                "{} {} {nulls}",
                quote_ident(&key.field),
                key.direction.as_sql()
            )
        })
        .collect();
    format!(" ORDER BY {}", parts.join(", "))
}

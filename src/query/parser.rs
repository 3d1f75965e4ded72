//! Compact text syntax for filters and sort keys
//!
//! Used by the CLI:
//! - filters: `age>=30`, `status=active`, `name~ann` (contains), `deleted_at=null`
//! - sort keys: `name`, `name:asc`, `created_at:desc`

use super::types::{Filter, SortDirection, SortKey};
use crate::error::{Error, Result};
use serde_json::Value;

// Longest operators first so `>=` wins over `>`
const OPERATORS: [&str; 7] = [">=", "<=", "!=", "=", ">", "<", "~"];

/// Parse a single `field<op>value` filter expression
pub fn parse_filter(expression: &str) -> Result<Filter> {
    let trimmed = expression.trim();
    let (pos, op) = OPERATORS
        .iter()
        .filter_map(|op| trimmed.find(op).map(|pos| (pos, *op)))
        .min_by_key(|(pos, op)| (*pos, std::cmp::Reverse(op.len())))
        .ok_or_else(|| Error::filter_parse(expression, "missing operator"))?;

    let field = trimmed[..pos].trim();
    let raw = trimmed[pos + op.len()..].trim();

    if field.is_empty() {
        return Err(Error::filter_parse(expression, "missing field name"));
    }
    if raw.is_empty() {
        return Err(Error::filter_parse(expression, "missing value"));
    }

    let filter = match op {
        "=" => Filter::eq(field, parse_value(raw)),
        "!=" => Filter::ne(field, parse_value(raw)),
        ">" => Filter::gt(field, parse_value(raw)),
        ">=" => Filter::gte(field, parse_value(raw)),
        "<" => Filter::lt(field, parse_value(raw)),
        "<=" => Filter::lte(field, parse_value(raw)),
        "~" => Filter::contains(field, raw),
        _ => return Err(Error::filter_parse(expression, "unknown operator")),
    };
    Ok(filter)
}

/// Parse several filter expressions and AND them together
pub fn parse_filters<S: AsRef<str>>(expressions: &[S]) -> Result<Option<Filter>> {
    let mut filters = expressions
        .iter()
        .map(|e| parse_filter(e.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter::and(filters)),
    })
}

/// Parse a `field[:asc|:desc]` sort key
pub fn parse_sort_key(expression: &str) -> Result<SortKey> {
    let trimmed = expression.trim();
    let (field, direction) = match trimmed.rsplit_once(':') {
        Some((field, dir)) => {
            let direction = match dir.trim().to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => {
                    return Err(Error::sort_parse(
                        expression,
                        format!("unknown direction '{other}'"),
                    ))
                }
            };
            (field.trim(), direction)
        }
        None => (trimmed, SortDirection::Asc),
    };

    if field.is_empty() {
        return Err(Error::sort_parse(expression, "missing field name"));
    }

    Ok(SortKey {
        field: field.to_string(),
        direction,
    })
}

/// Values that parse as JSON scalars keep their type; anything else is a string
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

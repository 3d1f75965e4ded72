//! In-memory evaluation of query criteria against JSON records

use super::types::{Filter, SortDirection, SortKey};
use serde_json::Value;
use std::cmp::Ordering;

/// Look up a field by dot path (`"address.city"`)
pub fn field_value<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Total order over JSON values used for sorting and range filters
///
/// Null < Bool < Number < String < Array < Object. Numbers compare as f64.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_values(l, r))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Compare two records by a list of sort keys
pub fn compare_records(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = field_value(a, &key.field).unwrap_or(&Value::Null);
        let right = field_value(b, &key.field).unwrap_or(&Value::Null);
        let ordering = match key.direction {
            SortDirection::Asc => compare_values(left, right),
            SortDirection::Desc => compare_values(right, left),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Check whether a record satisfies a filter
pub fn matches(filter: &Filter, record: &Value) -> bool {
    match filter {
        Filter::Eq { field, value } => values_equal(&lookup(record, field), value),
        Filter::Ne { field, value } => !values_equal(&lookup(record, field), value),
        Filter::Gt { field, value } => range(record, field, value, Ordering::is_gt),
        Filter::Gte { field, value } => range(record, field, value, Ordering::is_ge),
        Filter::Lt { field, value } => range(record, field, value, Ordering::is_lt),
        Filter::Lte { field, value } => range(record, field, value, Ordering::is_le),
        Filter::Contains { field, value } => match field_value(record, field) {
            Some(Value::String(s)) => s.contains(value.as_str()),
            Some(Value::Null) | None => false,
            Some(other) => other.to_string().contains(value.as_str()),
        },
        Filter::IsNull { field } => matches!(field_value(record, field), None | Some(Value::Null)),
        Filter::And { filters } => filters.iter().all(|f| matches(f, record)),
        Filter::Or { filters } => filters.iter().any(|f| matches(f, record)),
        Filter::Not { filter } => !matches(filter, record),
    }
}

/// Numbers are equal when their f64 forms are, so `30` matches `30.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b).is_eq(),
        _ => a == b,
    }
}

fn lookup(record: &Value, field: &str) -> Value {
    field_value(record, field).cloned().unwrap_or(Value::Null)
}

/// Range comparisons only hold between values of the same kind; null never matches
fn range(record: &Value, field: &str, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    let Some(actual) = field_value(record, field) else {
        return false;
    };
    let comparable = matches!(
        (actual, bound),
        (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_))
    );
    comparable && accept(compare_values(actual, bound))
}

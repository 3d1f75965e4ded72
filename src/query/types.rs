//! Query criteria types
//!
//! Sort keys, filter trees, and the descriptor that bundles them for a
//! data source call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordering direction for a sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A single sort key over a record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Field name (dot notation for nested JSON fields)
    pub field: String,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending sort on a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filter tree over record fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals value
    Eq { field: String, value: Value },
    /// Field differs from value
    Ne { field: String, value: Value },
    /// Field greater than value
    Gt { field: String, value: Value },
    /// Field greater than or equal to value
    Gte { field: String, value: Value },
    /// Field less than value
    Lt { field: String, value: Value },
    /// Field less than or equal to value
    Lte { field: String, value: Value },
    /// Field's text form contains a substring
    Contains { field: String, value: String },
    /// Field is missing or null
    IsNull { field: String },
    /// All children match
    And { filters: Vec<Filter> },
    /// Any child matches
    Or { filters: Vec<Filter> },
    /// Child does not match
    Not { filter: Box<Filter> },
}

impl Filter {
    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an inequality filter
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-or-equal filter
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-or-equal filter
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a substring filter
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a null check
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    /// Combine filters with AND
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { filters }
    }

    /// Combine filters with OR
    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or { filters }
    }

    /// Negate a filter
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Self::Not {
            filter: Box::new(filter),
        }
    }

    /// Visit every field name referenced by this filter
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Eq { field, .. }
            | Self::Ne { field, .. }
            | Self::Gt { field, .. }
            | Self::Gte { field, .. }
            | Self::Lt { field, .. }
            | Self::Lte { field, .. }
            | Self::Contains { field, .. }
            | Self::IsNull { field } => out.push(field),
            Self::And { filters } | Self::Or { filters } => {
                for filter in filters {
                    filter.collect_fields(out);
                }
            }
            Self::Not { filter } => filter.collect_fields(out),
        }
    }
}

/// Sort and filter criteria for a paged query
///
/// Fixed for the lifetime of a pager; every fetch reuses the same descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchDescriptor {
    /// Optional filter; `None` matches every record
    #[serde(default)]
    pub filter: Option<Filter>,
    /// Sort keys, most significant first
    #[serde(default)]
    pub sort: Vec<SortKey>,
}

impl FetchDescriptor {
    /// Create an unfiltered, unsorted descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

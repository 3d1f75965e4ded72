//! Pager configuration
//!
//! A `PagerConfig` holds what stays fixed for a pager's whole life: page
//! size, sort keys, filter, and logging mode. It can be built in code or
//! loaded from YAML or JSON.

use crate::error::{Error, Result, ResultExt};
use crate::logging::LogMode;
use crate::query::{FetchDescriptor, Filter, SortKey};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of items per fetch
pub const DEFAULT_PAGE_SIZE: usize = 20;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Configuration for a pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagerConfig {
    /// Maximum items per fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Sort keys, most significant first
    #[serde(default)]
    pub sort: Vec<SortKey>,

    /// Optional record filter
    #[serde(default)]
    pub filter: Option<Filter>,

    /// Logging mode
    #[serde(default)]
    pub log: LogMode,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            filter: None,
            log: LogMode::Default,
        }
    }
}

impl PagerConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Set the filter
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set logging mode
    #[must_use]
    pub fn with_log_mode(mut self, log: LogMode) -> Self {
        self.log = log;
        self
    }

    /// Sort and filter criteria as a descriptor
    pub fn descriptor(&self) -> FetchDescriptor {
        FetchDescriptor {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than 0",
            ));
        }

        if self.sort.iter().any(|key| key.field.trim().is_empty()) {
            return Err(Error::invalid_value("sort", "field name must not be empty"));
        }

        if let Some(filter) = &self.filter {
            if filter.fields().iter().any(|field| field.trim().is_empty()) {
                return Err(Error::invalid_value(
                    "filter",
                    "field name must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        parsed.with_context(|| format!("Failed to load pager config {}", path.display()))
    }
}

//! Error types for scroll-pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for scroll-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Query Errors
    // ============================================================================
    #[error("Invalid filter expression '{expression}': {message}")]
    FilterParse { expression: String, message: String },

    #[error("Invalid sort key '{expression}': {message}")]
    SortParse { expression: String, message: String },

    // ============================================================================
    // Data Source Errors
    // ============================================================================
    #[error("Data source error: {message}")]
    DataSource { message: String },

    #[error("Failed to decode record: {message}")]
    Decode { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // Pager Errors
    // ============================================================================
    #[error("Pager task has shut down")]
    PagerClosed,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a filter parse error
    pub fn filter_parse(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FilterParse {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create a sort parse error
    pub fn sort_parse(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SortParse {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create a data source error
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Check if this error came from the data source side of a fetch
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::DataSource { .. }
                | Error::Decode { .. }
                | Error::Database(_)
                | Error::Anyhow(_)
                | Error::Other(_)
        )
    }
}

/// Result type alias for scroll-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_value("page_size", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'page_size': must be greater than 0"
        );

        let err = Error::filter_parse("age>>3", "unknown operator");
        assert_eq!(
            err.to_string(),
            "Invalid filter expression 'age>>3': unknown operator"
        );

        assert_eq!(Error::PagerClosed.to_string(), "Pager task has shut down");
    }

    #[test]
    fn test_is_fetch_failure() {
        assert!(Error::data_source("connection reset").is_fetch_failure());
        assert!(Error::decode("bad row").is_fetch_failure());
        assert!(Error::from(anyhow::anyhow!("boom")).is_fetch_failure());

        assert!(!Error::config("bad").is_fetch_failure());
        assert!(!Error::PagerClosed.is_fetch_failure());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}

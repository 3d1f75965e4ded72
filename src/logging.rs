//! Pager logging sink
//!
//! Pagers report guard skips, dispatches, and commits through a [`Logger`].
//! Messages are built lazily: the closure passed to [`Logger::log`] or
//! [`Logger::error`] only runs when the logger is not silent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Target used when forwarding to `tracing`
pub const LOG_TARGET: &str = "scroll_pager";

/// Caller-supplied destination for pager messages
pub trait LogSink: Send + Sync {
    /// Record an informational message
    fn log(&self, message: &str);

    /// Record an error message
    fn error(&self, message: &str);
}

/// Logger handle shared by a pager and its fetch tasks
#[derive(Clone, Default)]
pub enum Logger {
    /// Drop every message without building it
    Silent,
    /// Forward to `tracing` (debug for log lines, error for errors)
    #[default]
    Default,
    /// Forward to a caller-supplied sink
    Custom(Arc<dyn LogSink>),
}

impl Logger {
    /// Wrap a custom sink
    pub fn custom(sink: impl LogSink + 'static) -> Self {
        Self::Custom(Arc::new(sink))
    }

    /// Whether messages will be built at all
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Log an informational message
    pub fn log(&self, message: impl FnOnce() -> String) {
        match self {
            Self::Silent => {}
            Self::Default => tracing::debug!(target: LOG_TARGET, "{}", message()),
            Self::Custom(sink) => sink.log(&message()),
        }
    }

    /// Log an error message
    pub fn error(&self, message: impl FnOnce() -> String) {
        match self {
            Self::Silent => {}
            Self::Default => tracing::error!(target: LOG_TARGET, "{}", message()),
            Self::Custom(sink) => sink.error(&message()),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("Logger::Silent"),
            Self::Default => f.write_str("Logger::Default"),
            Self::Custom(_) => f.write_str("Logger::Custom(..)"),
        }
    }
}

/// Logger selection in configuration files
///
/// `Custom` sinks cannot be named in a file; they are attached in code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// No pager messages
    Silent,
    /// Pager messages go to `tracing`
    #[default]
    Default,
}

impl From<LogMode> for Logger {
    fn from(mode: LogMode) -> Self {
        match mode {
            LogMode::Silent => Logger::Silent,
            LogMode::Default => Logger::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for Recording {
        fn log(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("log: {message}"));
        }

        fn error(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("error: {message}"));
        }
    }

    #[test]
    fn test_silent_never_builds_message() {
        let built = AtomicUsize::new(0);
        let logger = Logger::Silent;
        logger.log(|| {
            built.fetch_add(1, Ordering::SeqCst);
            "x".to_string()
        });
        logger.error(|| {
            built.fetch_add(1, Ordering::SeqCst);
            "y".to_string()
        });
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!logger.is_enabled());
    }

    #[test]
    fn test_custom_sink_receives_messages() {
        let sink = Arc::new(Recording::default());
        let logger = Logger::Custom(sink.clone());
        logger.log(|| "loading".to_string());
        logger.error(|| "failed".to_string());

        let lines = sink.lines.lock().unwrap();
        assert_eq!(*lines, vec!["log: loading", "error: failed"]);
    }

    #[test]
    fn test_log_mode_conversion() {
        assert!(matches!(Logger::from(LogMode::Silent), Logger::Silent));
        assert!(matches!(Logger::from(LogMode::Default), Logger::Default));
        assert_eq!(format!("{:?}", Logger::custom(Recording::default())), "Logger::Custom(..)");
    }
}

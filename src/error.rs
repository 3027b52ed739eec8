//! Error types for memwatch.
//!
//! One enum covers snapshot acquisition, terminal mode handling, configuration
//! and single-shot report output. Missing history and inaccessible processes
//! are not errors and never surface here.

use std::io;
use thiserror::Error;

/// Error type for memwatch operations.
#[derive(Debug, Error)]
pub enum MemwatchError {
    /// An OS statistics call failed.
    #[error("failed to read memory statistics from '{source_id}': {message}")]
    Provider {
        /// The snapshot source that failed.
        source_id: &'static str,
        /// Error message describing the failure.
        message: String,
    },

    /// Terminal mode acquisition, restoration or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// A single-shot report could not be produced.
    #[error("report error: {0}")]
    Report(String),
}

impl MemwatchError {
    /// Builds a [`MemwatchError::Provider`] for the given source.
    pub fn provider(source_id: &'static str, message: impl Into<String>) -> Self {
        Self::Provider { source_id, message: message.into() }
    }
}

/// Result type alias for memwatch operations.
pub type Result<T> = std::result::Result<T, MemwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_includes_source_and_message() {
        let err = MemwatchError::provider("linux", "/proc/meminfo not readable");
        let display = err.to_string();

        assert!(display.contains("linux"), "Error should include source: {}", display);
        assert!(display.contains("/proc/meminfo"), "Error should include message: {}", display);
    }

    #[test]
    fn test_config_parse_error_includes_line_number() {
        let err = MemwatchError::ConfigParse { line: 7, message: "invalid value".to_string() };
        let display = err.to_string();

        assert!(display.contains('7'), "Error should include line number: {}", display);
        assert!(display.contains("invalid value"));
    }

    #[test]
    fn test_config_invalid_includes_key() {
        let err = MemwatchError::ConfigInvalid {
            key: "tick_ms".to_string(),
            message: "must be between 10 and 10000".to_string(),
        };

        assert!(err.to_string().contains("tick_ms"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "tcsetattr failed");
        let err: MemwatchError = io_err.into();

        assert!(matches!(err, MemwatchError::Terminal(_)), "Should convert to Terminal");
        assert!(err.to_string().contains("tcsetattr failed"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemwatchError>();
    }
}

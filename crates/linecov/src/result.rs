//! Result and error types for Linecov.

use thiserror::Error;

/// Result type for Linecov operations
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Errors that can occur in Linecov
///
/// Only construction and configuration can fail. Once a collector exists,
/// recording is total and observation problems are dropped as missed events.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Collector options did not name a source root
    #[error("root is required")]
    MissingRoot,

    /// Collector options named a mode other than `files` or `lines`
    #[error("mode is invalid: {value}")]
    InvalidMode {
        /// The rejected mode value
        value: String,
    },

    /// Runner settings could not be interpreted
    #[error("Invalid settings: {message}")]
    InvalidSettings {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CoverageError {
    /// Create an invalid mode error
    #[must_use]
    pub fn invalid_mode(value: impl Into<String>) -> Self {
        Self::InvalidMode {
            value: value.into(),
        }
    }

    /// Create an invalid settings error
    #[must_use]
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    /// Whether this error is an argument error raised while building a collector
    #[must_use]
    pub const fn is_argument_error(&self) -> bool {
        matches!(self, Self::MissingRoot | Self::InvalidMode { .. })
    }
}

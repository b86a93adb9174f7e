//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Malformed trace input
    #[error("Trace line {line}: {message}")]
    Trace {
        /// 1-based line number in the trace file
        line: usize,
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Linecov library error
    #[error("Coverage error: {0}")]
    Coverage(#[from] linecov::CoverageError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a trace error
    #[must_use]
    pub fn trace(line: usize, message: impl Into<String>) -> Self {
        Self::Trace {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_error_names_line() {
        let err = CliError::trace(7, "missing line number");
        assert_eq!(err.to_string(), "Trace line 7: missing line number");
    }

    #[test]
    fn test_coverage_error_converts() {
        let err: CliError = linecov::CoverageError::MissingRoot.into();
        assert_eq!(err.to_string(), "Coverage error: root is required");
    }
}

//! Error types for SheetFAQ.
//!
//! Library crates use [`SheetFaqError`] via `thiserror`.
//! The bot binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SheetFAQ operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetFaqError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a sheet or calling the Bot API.
    #[error("network error: {0}")]
    Network(String),

    /// CSV parsing or column detection error for a single source.
    #[error("csv error: {message}")]
    Csv { message: String },

    /// Telegram Bot API returned `ok: false`.
    #[error("telegram error: {0}")]
    Telegram(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, malformed response, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SheetFaqError>;

impl SheetFaqError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a CSV error from any displayable message.
    pub fn csv(msg: impl Into<String>) -> Self {
        Self::Csv {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SheetFaqError::config("missing bot token");
        assert_eq!(err.to_string(), "config error: missing bot token");

        let err = SheetFaqError::csv("no question/answer columns");
        assert!(err.to_string().contains("no question/answer columns"));
    }
}

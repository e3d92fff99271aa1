//! Error taxonomy for regex-filter
//!
//! Every failure is local and recoverable. Nothing here terminates the host.

use thiserror::Error;

/// Errors produced while loading, mutating or applying rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Pattern failed to compile
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A compiled pattern failed while matching (e.g. backtrack limit exceeded)
    #[error("rule {index} (`{pattern}`) failed: {message}")]
    RuleRuntime {
        index: usize,
        pattern: String,
        message: String,
    },

    /// 1-based index outside `[1, len]`
    #[error("invalid index {index}, valid range: 1-{len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The configuration document has no record matching an in-memory rule
    #[error("no `{pattern}` record in `{bucket}`; configuration is out of sync")]
    ConfigDesync { pattern: String, bucket: String },

    /// The document could not be written
    #[error("failed to save {path}: {message}")]
    Persistence { path: String, message: String },

    /// The document could not be read or parsed
    #[error("failed to load {path}: {message}")]
    ConfigParse { path: String, message: String },
}

impl FilterError {
    pub(crate) fn invalid_pattern(pattern: &str, err: impl std::fmt::Display) -> Self {
        FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

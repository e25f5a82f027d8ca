//! Unified error types for cpe-match.
//!
//! Malformed identifier keys are rejected here, at the parse boundary.
//! "No match" outcomes (unresolvable vendors, unknown lookup keys) are not
//! errors and never appear in this hierarchy.

use thiserror::Error;

/// Main error type for cpe-match operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CpeMatchError {
    /// Errors during corpus/feed parsing
    #[error("Failed to parse corpus: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Malformed CPE 2.3 URI: {uri} - {reason}")]
    InvalidCpeUri { uri: String, reason: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },
}

/// Convenient Result type for cpe-match operations
pub type Result<T> = std::result::Result<T, CpeMatchError>;

impl CpeMatchError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a malformed CPE URI
    pub fn invalid_cpe_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::parse(
            "CPE identifier key",
            ParseErrorKind::InvalidCpeUri {
                uri: uri.into(),
                reason: reason.into(),
            },
        )
    }

    /// Create a parse error for a missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<serde_json::Error> for CpeMatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

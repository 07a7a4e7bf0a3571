//! Error types for the querylink crate.

use thiserror::Error;

/// Errors that can occur when compiling, applying, or decoding definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryLinkError {
    /// A definition references a field the record type does not expose.
    #[error("field '{field}' does not exist on {record}")]
    UnknownField { field: String, record: &'static str },

    /// Operator cannot be applied to the resolved field kind or literal.
    #[error("operator '{operator}' is not supported on field '{field}' of kind {kind}: {reason}")]
    UnsupportedOperator {
        field: String,
        operator: &'static str,
        kind: String,
        reason: String,
    },

    /// A filter parameter could not be split into field, operator and value.
    #[error("malformed filter '{input}': {reason}")]
    MalformedFilter { input: String, reason: &'static str },

    /// A second override was registered for the same field in one set.
    #[error("an override for field '{field}' is already registered")]
    DuplicateOverride { field: String },
}

/// Result type for querylink operations.
pub type Result<T> = std::result::Result<T, QueryLinkError>;

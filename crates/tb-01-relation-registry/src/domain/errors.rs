//! Relation registry error types.

use thiserror::Error;

/// Errors raised while reading or folding relation data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The source does not exist.
    #[error("relation source not found: {0}")]
    SourceNotFound(String),

    /// The source exists but could not be read.
    #[error("relation source unreadable: {location}: {reason}")]
    SourceUnreadable { location: String, reason: String },

    /// A row lacks a key column (or the value is blank).
    #[error("{relation} row missing required column {column}")]
    MissingColumn {
        relation: &'static str,
        column: &'static str,
    },

    /// The identifier document is not valid JSON.
    #[error("identifier document {location} is malformed: {reason}")]
    MalformedDocument { location: String, reason: String },
}

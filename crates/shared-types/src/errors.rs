//! # Error Types
//!
//! Errors shared across bridge crates.

use thiserror::Error;

/// Errors raised while validating caller-supplied event fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Bridge operational states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Relation files are being folded into the registry.
    Loading,
    /// Registry frozen; router and API running.
    Running,
    /// Shutdown signalled; tasks draining.
    Stopping,
    /// All tasks stopped.
    Stopped,
}

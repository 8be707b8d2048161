//! # Satellite Connection
//!
//! The single capability the router depends on. Adding a satellite domain
//! means registering another implementation under its source tag.

use async_trait::async_trait;
use shared_types::BridgeEvent;
use thiserror::Error;

/// Errors a satellite handler can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SatelliteError {
    /// The satellite refused the event.
    #[error("satellite {satellite} rejected event: {reason}")]
    Rejected { satellite: String, reason: String },

    /// The satellite could not be reached.
    #[error("satellite {0} unavailable")]
    Unavailable(String),
}

/// Handler for events routed to one satellite domain.
#[async_trait]
pub trait SatelliteConnection: Send + Sync {
    /// Handle one event. May suspend; the router bounds it with a timeout.
    async fn handle(&self, event: &BridgeEvent) -> Result<(), SatelliteError>;
}

//! # Satellite Adapters
//!
//! Stand-in connections for the seven satellite domains. Each one records the
//! event and acknowledges it; domain behaviour lives outside the bridge.

use async_trait::async_trait;
use shared_bus::{EventRouter, SatelliteConnection, SatelliteError};
use shared_types::BridgeEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Source tags with a registered connection.
pub const SATELLITE_TAGS: [&str; 7] = [
    "cosmogenesis",
    "stone-grimoire",
    "codex-1499",
    "living-arcanae",
    "living-arcanae-game",
    "circuitum99",
    "magical-mystery-house",
];

/// Acknowledging connection for one satellite tag.
pub struct LoggingSatellite {
    tag: &'static str,
    handled: AtomicU64,
}

impl LoggingSatellite {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            handled: AtomicU64::new(0),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Events acknowledged so far.
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SatelliteConnection for LoggingSatellite {
    async fn handle(&self, event: &BridgeEvent) -> Result<(), SatelliteError> {
        self.handled.fetch_add(1, Ordering::Relaxed);
        info!(
            satellite = self.tag,
            event_id = %event.id,
            event_type = %event.event_type,
            "Satellite received event"
        );
        Ok(())
    }
}

/// Register a `LoggingSatellite` for every tag in [`SATELLITE_TAGS`].
///
/// Returns the connections so callers can observe them.
pub fn register_satellites(router: &mut EventRouter) -> Vec<Arc<LoggingSatellite>> {
    SATELLITE_TAGS
        .into_iter()
        .map(|tag| {
            let satellite = Arc::new(LoggingSatellite::new(tag));
            router.register(tag, satellite.clone());
            satellite
        })
        .collect()
}

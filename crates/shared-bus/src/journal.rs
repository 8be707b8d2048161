//! # Queue Journal
//!
//! Mirrors the pending queue to an NDJSON file so readers outside the process
//! (the `/sync` snapshot) can see what is still waiting.

use crate::errors::BusError;
use shared_types::BridgeEvent;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rewrites a journal file with the current pending events, one per line.
#[derive(Debug, Clone)]
pub struct QueueJournal {
    path: PathBuf,
}

impl QueueJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the journal contents with `events`.
    ///
    /// Written to a sibling temp file and renamed, so readers never observe a
    /// half-written journal.
    pub async fn persist(&self, events: &[BridgeEvent]) -> Result<(), BusError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BusError::io(parent, e))?;
        }

        let mut body = Vec::new();
        for event in events {
            serde_json::to_writer(&mut body, event).map_err(|source| BusError::Serialize {
                what: "queued event",
                source,
            })?;
            body.push(b'\n');
        }

        let tmp = self.path.with_extension("ndjson.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| BusError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BusError::io(&self.path, e))?;

        debug!(path = %self.path.display(), pending = events.len(), "Queue journal written");
        Ok(())
    }
}

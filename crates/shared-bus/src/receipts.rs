//! # Receipt Sinks
//!
//! Append-only destinations for receipts written after each routed event.

use crate::errors::BusError;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Receipt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for receipts. Implementations must never rewrite or drop an
/// appended receipt.
#[async_trait]
pub trait ReceiptSink: Send + Sync {
    /// Append one receipt.
    async fn append(&self, receipt: &Receipt) -> Result<(), BusError>;
}

/// Ordered in-memory receipt log.
#[derive(Default)]
pub struct InMemoryReceiptLog {
    receipts: RwLock<Vec<Receipt>>,
}

impl InMemoryReceiptLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all receipts in append order.
    #[must_use]
    pub fn receipts(&self) -> Vec<Receipt> {
        self.receipts.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.receipts.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receipts.read().is_empty()
    }
}

#[async_trait]
impl ReceiptSink for InMemoryReceiptLog {
    async fn append(&self, receipt: &Receipt) -> Result<(), BusError> {
        self.receipts.write().push(receipt.clone());
        Ok(())
    }
}

/// Writes each receipt as `<dir>/<event-id>.json`.
///
/// The directory is created on first use. Event ids are unique, so a receipt
/// file is never overwritten.
pub struct FileReceiptSink {
    dir: PathBuf,
}

impl FileReceiptSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory receipts are written into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ReceiptSink for FileReceiptSink {
    async fn append(&self, receipt: &Receipt) -> Result<(), BusError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BusError::io(&self.dir, e))?;

        let path = self.dir.join(format!("{}.json", receipt.event.id));
        let body = serde_json::to_vec_pretty(receipt).map_err(|source| BusError::Serialize {
            what: "receipt",
            source,
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| BusError::io(&path, e))?;

        debug!(path = %path.display(), "Receipt saved");
        Ok(())
    }
}

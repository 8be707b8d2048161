//! # Event Router
//!
//! Pops one event per drain, dispatches it by source tag, writes a receipt.
//!
//! ```text
//! enqueued → (waiting in queue) → dispatching → routed
//! ```
//!
//! There is no retry state. Every dequeued event ends in exactly one receipt.

use crate::connection::SatelliteConnection;
use crate::publisher::InMemoryEventQueue;
use crate::receipts::ReceiptSink;
use futures::FutureExt;
use shared_types::{BridgeEvent, DispatchOutcome, Receipt};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for routed events.
#[derive(Debug, Default)]
pub struct RouterStats {
    /// Events removed from the queue.
    pub total_drained: AtomicU64,
    /// Handler returned `Ok`.
    pub total_delivered: AtomicU64,
    /// Handler returned an error or panicked.
    pub total_failed: AtomicU64,
    /// Handler exceeded the dispatch timeout.
    pub total_timeouts: AtomicU64,
    /// No connection registered for the source.
    pub total_unknown_source: AtomicU64,
    /// Receipt sink reported an error.
    pub total_receipt_errors: AtomicU64,
}

impl RouterStats {
    fn record(&self, outcome: DispatchOutcome) {
        self.total_drained.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Delivered => &self.total_delivered,
            DispatchOutcome::HandlerFailed => &self.total_failed,
            DispatchOutcome::TimedOut => &self.total_timeouts,
            DispatchOutcome::UnknownSource => &self.total_unknown_source,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counters as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "drained": self.total_drained.load(Ordering::Relaxed),
            "delivered": self.total_delivered.load(Ordering::Relaxed),
            "failed": self.total_failed.load(Ordering::Relaxed),
            "timeouts": self.total_timeouts.load(Ordering::Relaxed),
            "unknownSource": self.total_unknown_source.load(Ordering::Relaxed),
            "receiptErrors": self.total_receipt_errors.load(Ordering::Relaxed),
        })
    }
}

/// Dispatches queued events to satellite connections by source tag.
pub struct EventRouter {
    queue: Arc<InMemoryEventQueue>,
    connections: HashMap<String, Arc<dyn SatelliteConnection>>,
    receipts: Arc<dyn ReceiptSink>,
    dispatch_timeout: Option<Duration>,
    /// Held for the whole of `drain_one`; drains never overlap.
    drain_guard: tokio::sync::Mutex<()>,
    stats: RouterStats,
}

impl EventRouter {
    /// Create a router with no registered satellites and no dispatch timeout.
    pub fn new(queue: Arc<InMemoryEventQueue>, receipts: Arc<dyn ReceiptSink>) -> Self {
        Self {
            queue,
            connections: HashMap::new(),
            receipts,
            dispatch_timeout: None,
            drain_guard: tokio::sync::Mutex::new(()),
            stats: RouterStats::default(),
        }
    }

    /// Bound each `handle` call. `None` waits indefinitely.
    #[must_use]
    pub fn with_dispatch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Register the connection for a source tag.
    ///
    /// Returns the connection previously registered under the tag, if any.
    pub fn register(
        &mut self,
        source: impl Into<String>,
        connection: Arc<dyn SatelliteConnection>,
    ) -> Option<Arc<dyn SatelliteConnection>> {
        let source = source.into();
        debug!(source = %source, "Satellite registered");
        self.connections.insert(source, connection)
    }

    /// Registered source tags, sorted.
    #[must_use]
    pub fn registered_sources(&self) -> Vec<&str> {
        let mut sources: Vec<_> = self.connections.keys().map(String::as_str).collect();
        sources.sort_unstable();
        sources
    }

    #[must_use]
    pub fn queue(&self) -> &Arc<InMemoryEventQueue> {
        &self.queue
    }

    #[must_use]
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Route the head event, if any, and record its receipt.
    ///
    /// No-op on an empty queue. Handler failures are absorbed here and never
    /// propagate to the caller.
    pub async fn drain_one(&self) -> Option<Receipt> {
        let _guard = self.drain_guard.lock().await;

        let event = self.queue.dequeue()?;
        let outcome = self.dispatch(&event).await;
        self.stats.record(outcome);

        let receipt = Receipt::new(event, outcome);
        if let Err(e) = self.receipts.append(&receipt).await {
            self.stats.total_receipt_errors.fetch_add(1, Ordering::Relaxed);
            warn!(event_id = %receipt.event.id, error = %e, "Failed to save receipt");
        } else {
            info!(
                event_id = %receipt.event.id,
                outcome = outcome.as_str(),
                timestamp = %receipt.timestamp,
                "Receipt saved"
            );
        }
        Some(receipt)
    }

    async fn dispatch(&self, event: &BridgeEvent) -> DispatchOutcome {
        info!(
            event_id = %event.id,
            source = %event.source,
            event_type = %event.event_type,
            "Routing event"
        );

        let Some(connection) = self.connections.get(&event.source) else {
            warn!(event_id = %event.id, source = %event.source, "Unknown event source, dropping event");
            return DispatchOutcome::UnknownSource;
        };

        let handled = AssertUnwindSafe(connection.handle(event)).catch_unwind();
        let result = match self.dispatch_timeout {
            Some(limit) => match tokio::time::timeout(limit, handled).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        event_id = %event.id,
                        source = %event.source,
                        timeout_ms = limit.as_millis(),
                        "Satellite handler timed out"
                    );
                    return DispatchOutcome::TimedOut;
                }
            },
            None => handled.await,
        };

        match result {
            Ok(Ok(())) => DispatchOutcome::Delivered,
            Ok(Err(e)) => {
                warn!(event_id = %event.id, source = %event.source, error = %e, "Satellite handler failed");
                DispatchOutcome::HandlerFailed
            }
            Err(_) => {
                warn!(event_id = %event.id, source = %event.source, "Satellite handler panicked");
                DispatchOutcome::HandlerFailed
            }
        }
    }
}

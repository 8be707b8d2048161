//! # Event Publisher
//!
//! The enqueue side of the bus and the in-process FIFO behind it.

use parking_lot::Mutex;
use shared_types::{BridgeEvent, EventId, EventIdGenerator};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Trait for handing events to the bridge.
///
/// Enqueue is synchronous and infallible: it always returns an id.
pub trait EventPublisher: Send + Sync {
    /// Queue an event for routing.
    ///
    /// # Returns
    ///
    /// The id assigned to the new event.
    fn enqueue(&self, source: &str, event_type: &str, data: serde_json::Value) -> EventId;

    /// Get the total number of events enqueued.
    fn events_enqueued(&self) -> u64;
}

/// In-memory FIFO of pending events.
///
/// Enqueue and dequeue take the same mutex, so an enqueue racing a drain can
/// neither be lost nor duplicated.
pub struct InMemoryEventQueue {
    /// Pending events, head first.
    pending: Mutex<VecDeque<BridgeEvent>>,

    /// Issues unique ids.
    ids: EventIdGenerator,

    /// Bumped on every enqueue and dequeue.
    revision: AtomicU64,

    /// Total events enqueued.
    events_enqueued: AtomicU64,
}

impl InMemoryEventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            ids: EventIdGenerator::new(),
            revision: AtomicU64::new(0),
            events_enqueued: AtomicU64::new(0),
        }
    }

    /// Remove and return the head event, if any.
    pub fn dequeue(&self) -> Option<BridgeEvent> {
        let event = self.pending.lock().pop_front();
        if event.is_some() {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
        event
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Copy of the pending events in queue order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BridgeEvent> {
        self.pending.lock().iter().cloned().collect()
    }

    /// Counter that changes whenever the queue contents change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
}

impl Default for InMemoryEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventQueue {
    fn enqueue(&self, source: &str, event_type: &str, data: serde_json::Value) -> EventId {
        let mut pending = self.pending.lock();
        // Id issued under the lock so queue order matches id order.
        let id = self.ids.next_id();
        pending.push_back(BridgeEvent::new(id.clone(), source, event_type, data));
        let depth = pending.len();
        drop(pending);

        self.revision.fetch_add(1, Ordering::AcqRel);
        self.events_enqueued.fetch_add(1, Ordering::Relaxed);

        debug!(
            event_id = %id,
            source = source,
            event_type = event_type,
            depth = depth,
            "Event enqueued"
        );
        id
    }

    fn events_enqueued(&self) -> u64 {
        self.events_enqueued.load(Ordering::Relaxed)
    }
}

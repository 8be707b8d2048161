//! # Core Bridge Entities
//!
//! ## Clusters
//!
//! - **Events**: `EventId`, `EventIdGenerator`, `BridgeEvent`
//! - **Receipts**: `Receipt`, `DispatchOutcome`

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::EventError;

/// Modulus applied to the millisecond clock for the short suffix of an id.
pub const EVENT_ID_MODULUS: u64 = 144;

/// Prefix carried by every generated event id.
pub const EVENT_ID_PREFIX: &str = "EVT";

/// Current UTC time as an ISO-8601 string with millisecond precision.
///
/// Matches the `YYYY-MM-DDTHH:MM:SS.sssZ` shape used by receipt files.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// CLUSTER A: EVENTS
// =============================================================================

/// Identifier of an enqueued event: `EVT-<epoch-millis>-<millis mod 144>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Build the id for a given millisecond stamp.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(format!(
            "{}-{}-{}",
            EVENT_ID_PREFIX,
            millis,
            millis % EVENT_ID_MODULUS
        ))
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond component of the id, if it has the generated shape.
    #[must_use]
    pub fn millis(&self) -> Option<u64> {
        let mut parts = self.0.splitn(3, '-');
        match (parts.next(), parts.next()) {
            (Some(EVENT_ID_PREFIX), Some(millis)) => millis.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Issues event ids with a strictly increasing millisecond component.
///
/// When the wall clock has not advanced past the last issued stamp, the
/// previous stamp plus one is used instead, so ids never repeat within the
/// generator's lifetime.
#[derive(Debug, Default)]
pub struct EventIdGenerator {
    last_millis: AtomicU64,
}

impl EventIdGenerator {
    /// Create a generator with no issued ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id using the system clock.
    pub fn next_id(&self) -> EventId {
        self.next_id_at(Utc::now().timestamp_millis().max(0) as u64)
    }

    /// Issue the next id as if the clock read `now_millis`.
    pub fn next_id_at(&self, now_millis: u64) -> EventId {
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let candidate = if now_millis > last { now_millis } else { last + 1 };
            match self.last_millis.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return EventId::from_millis(candidate),
                Err(observed) => last = observed,
            }
        }
    }
}

/// An event describing activity in a satellite domain.
///
/// Built once by the queue at enqueue time; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Unique id within the process run.
    pub id: EventId,
    /// Source tag naming the satellite domain (`circuitum99`, ...).
    pub source: String,
    /// Free-form event type (`ping`, `sync`, ...).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Arbitrary payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// ISO-8601 enqueue time.
    pub timestamp: String,
}

impl BridgeEvent {
    /// Assemble an event stamped with the current time.
    pub fn new(
        id: EventId,
        source: impl Into<String>,
        event_type: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            event_type: event_type.into(),
            data,
            timestamp: iso_timestamp(),
        }
    }
}

/// Caller-supplied fields of an event before an id is assigned.
///
/// This is the body accepted by the HTTP ingestion route. Absent fields
/// decode as blank so `validate` can name the missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventDraft {
    /// Reject drafts with a blank source or type.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.source.trim().is_empty() {
            return Err(EventError::MissingField("source"));
        }
        if self.event_type.trim().is_empty() {
            return Err(EventError::MissingField("type"));
        }
        Ok(())
    }
}

// =============================================================================
// CLUSTER B: RECEIPTS
// =============================================================================

/// How the router disposed of a dequeued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The satellite handler returned successfully.
    Delivered,
    /// The satellite handler returned an error.
    HandlerFailed,
    /// The handler did not finish within the dispatch timeout.
    TimedOut,
    /// No connection is registered for the event's source; dropped.
    UnknownSource,
}

impl DispatchOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::HandlerFailed => "handler_failed",
            Self::TimedOut => "timed_out",
            Self::UnknownSource => "unknown_source",
        }
    }
}

/// Append-only proof that an event was dequeued and routed (or dropped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// ISO-8601 time the receipt was written.
    pub timestamp: String,
    /// The routed event, verbatim.
    pub event: BridgeEvent,
    /// Always `true`: the event left the queue and reached a terminal state.
    pub processed: bool,
    /// Terminal disposition.
    pub outcome: DispatchOutcome,
}

impl Receipt {
    /// Stamp a receipt for `event` with the current time.
    #[must_use]
    pub fn new(event: BridgeEvent, outcome: DispatchOutcome) -> Self {
        Self {
            timestamp: iso_timestamp(),
            event,
            processed: true,
            outcome,
        }
    }
}

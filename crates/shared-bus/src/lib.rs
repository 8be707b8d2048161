//! # Shared Bus - Event Queue and Satellite Routing
//!
//! The write path of the bridge: producers enqueue events, a single drain
//! task pops them one per tick and hands each to the satellite connection
//! registered for its source tag, then records a receipt.
//!
//! ```text
//! producers ──enqueue()──→ ┌──────────────┐
//!                          │  EventQueue  │ (strict FIFO, one mutex)
//!                          └──────┬───────┘
//!                                 │ drain_one() per tick
//!                                 ▼
//!                          ┌──────────────┐   source tag   ┌────────────────────┐
//!                          │ EventRouter  │ ─────────────→ │ SatelliteConnection│
//!                          └──────┬───────┘                └────────────────────┘
//!                                 │
//!                                 ▼
//!                            ReceiptSink
//! ```
//!
//! ## Delivery
//!
//! - **At-most-once:** there is no retry state. Unknown sources, handler
//!   errors, panics and timeouts are all terminal and still produce a receipt.
//! - **One drain at a time:** the router serializes `drain_one` internally and
//!   the scheduler awaits each drain before waiting for the next tick.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod connection;
pub mod errors;
pub mod journal;
pub mod publisher;
pub mod receipts;
pub mod router;
pub mod scheduler;

// Re-export main types
pub use connection::{SatelliteConnection, SatelliteError};
pub use errors::BusError;
pub use journal::QueueJournal;
pub use publisher::{EventPublisher, InMemoryEventQueue};
pub use receipts::{FileReceiptSink, InMemoryReceiptLog, ReceiptSink};
pub use router::{EventRouter, RouterStats};
pub use scheduler::{DrainScheduler, MIN_DRAIN_PERIOD};

use std::time::Duration;

/// Period between drain ticks.
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on a single satellite `handle` call.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// File name of the pending-event journal inside the events directory.
pub const QUEUE_JOURNAL_FILE: &str = "queue.ndjson";

/// Directory name holding receipt files inside the events directory.
pub const RECEIPTS_DIR: &str = "receipts";

//! # Bridge Runtime Library
//!
//! Exposes the runtime's modules for the binary and for integration tests.
//! The entry point is `main.rs`.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the shared store/queue context
//! - `adapters/` - satellite connections registered with the event router
//! - `runtime` - startup and shutdown orchestration
//!
//! ## Wiring
//!
//! ```text
//! registry/maps/*.csv ──RelationLoader──→ RegistryStore (Arc, frozen)
//!                                               │
//!                                               ▼
//! POST /events ──→ EventQueue ◀── drain tick ── Registry API ──→ GET /registry, /sync, /relations
//!                      │
//!                      ▼
//!                 EventRouter ──→ satellites ──→ events/receipts/<id>.json
//! ```

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod runtime;

pub use container::{load_config, BridgeConfig, BridgeContext, RouterConfig};
pub use runtime::{BridgeRuntime, RuntimeError};

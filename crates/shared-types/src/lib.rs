//! # Shared Types Crate
//!
//! Value types that cross crate boundaries inside the bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `BridgeEvent` and `Receipt` are defined once
//!   and serialized with the same field names everywhere (queue journal,
//!   receipt files, `/sync`).
//! - **Immutable Events**: an event is fully built at enqueue time and never
//!   mutated afterwards; the router only reads it.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;

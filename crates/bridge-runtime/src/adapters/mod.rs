//! # Adapter Implementations
//!
//! Concrete `SatelliteConnection`s registered with the event router.

pub mod satellites;

pub use satellites::{register_satellites, LoggingSatellite, SATELLITE_TAGS};

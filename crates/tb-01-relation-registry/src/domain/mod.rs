//! Domain layer for the relation registry.
//!
//! Pure data and folding logic; no I/O.

pub mod entities;
pub mod errors;
pub mod store;
pub mod tabular;

pub use entities::*;
pub use errors::RegistryError;
pub use store::{LoadSummary, RegistryDelta, RegistryStats, RegistryStore};
pub use tabular::{parse_table, TableData};

//! # Relation Registry Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Folds the small tabular relation files (node→room, node→chapel,
//! arcana→path, shem pairs) and the primary identifier document into one
//! in-memory registry with five keyed collections.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `node.room = r` ⇒ `r` exists and lists the node | `domain/store.rs` - `apply_node_room()` |
//! | `node.chapel = c` ⇒ `c` exists and lists the node | `domain/store.rs` - `apply_node_chapel()` |
//! | Re-applying a row is a no-op | `domain/store.rs` - `add_member()` |
//! | Store never removes entries | `domain/store.rs` - no delete API |
//!
//! ## Load Flow
//!
//! ```text
//! [relation files] ──SourceReader──→ RelationLoader ──RegistryDelta──→ RegistryStore
//!                                      (parse_table)                  (apply_delta)
//! ```
//!
//! Missing or unreadable sources are skipped with a warning; rows for unknown
//! relation types are ignored; rows missing a key column are rejected one by
//! one. Nothing here aborts a load.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/fs_reader.rs - SourceReader over a root directory     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - RegistryReader (read accessors)            │
//! │  ports/outbound.rs - SourceReader (raw text by location)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/entities.rs - Node, Room, Chapel, ArcanaEntry, ShemPair │
//! │  domain/tabular.rs  - header + comma-split rows                 │
//! │  domain/store.rs    - RegistryStore                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod loader;
pub mod ports;

pub use adapters::FsSourceReader;
pub use domain::{
    parse_table, ArcanaEntry, Chapel, LoadSummary, Node, RegistryDelta, RegistryError, RegistryStats,
    RegistryStore, RelationRow, RelationType, Room, ShemPair, TableData,
};
pub use loader::{default_sources, RelationLoader, RelationSource};
pub use ports::{RegistryReader, SourceReader};

/// Location of the primary identifier document, relative to the registry root.
pub const ID_DOCUMENT: &str = "ids.json";

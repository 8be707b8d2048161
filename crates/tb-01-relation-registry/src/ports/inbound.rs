//! # Inbound Port - RegistryReader
//!
//! Read-only view of a built registry. The HTTP layer depends on this trait
//! rather than on `RegistryStore` directly.

use crate::domain::{ArcanaEntry, Chapel, Node, RegistryStats, RegistryStore, Room, ShemPair};
use serde_json::Value;

pub trait RegistryReader: Send + Sync {
    fn get_node(&self, id: &str) -> Option<Node>;
    fn get_room(&self, id: &str) -> Option<Room>;
    fn get_chapel(&self, id: &str) -> Option<Chapel>;
    fn get_arcana(&self, id: &str) -> Option<ArcanaEntry>;
    fn get_shem(&self, id: &str) -> Option<ShemPair>;
    fn stats(&self) -> RegistryStats;
    /// The primary identifier document, if one was loaded.
    fn source_document(&self) -> Option<Value>;
}

impl RegistryReader for RegistryStore {
    fn get_node(&self, id: &str) -> Option<Node> {
        RegistryStore::get_node(self, id).cloned()
    }

    fn get_room(&self, id: &str) -> Option<Room> {
        RegistryStore::get_room(self, id).cloned()
    }

    fn get_chapel(&self, id: &str) -> Option<Chapel> {
        RegistryStore::get_chapel(self, id).cloned()
    }

    fn get_arcana(&self, id: &str) -> Option<ArcanaEntry> {
        RegistryStore::get_arcana(self, id).cloned()
    }

    fn get_shem(&self, id: &str) -> Option<ShemPair> {
        RegistryStore::get_shem(self, id).cloned()
    }

    fn stats(&self) -> RegistryStats {
        RegistryStore::stats(self)
    }

    fn source_document(&self) -> Option<Value> {
        RegistryStore::source_document(self).cloned()
    }
}

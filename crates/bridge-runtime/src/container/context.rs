//! # Bridge Context
//!
//! Owns the two pieces of shared state: the registry store, frozen after the
//! initial fold, and the event queue. Everything else borrows them through
//! `Arc`.

use shared_bus::InMemoryEventQueue;
use std::sync::Arc;
use tb_01_relation_registry::{
    default_sources, FsSourceReader, LoadSummary, RegistryStore, RelationLoader, RelationSource,
    ID_DOCUMENT,
};
use tb_02_registry_api::PathsConfig;

/// Shared state handed to the router and the API.
pub struct BridgeContext {
    /// Read-only after construction.
    pub store: Arc<RegistryStore>,
    /// Single FIFO shared by producers and the drain task.
    pub queue: Arc<InMemoryEventQueue>,
    /// Outcome of the initial fold.
    pub summary: LoadSummary,
}

impl BridgeContext {
    /// Fold the default relation sources under `paths.registry_dir`.
    pub async fn load(paths: &PathsConfig) -> Self {
        Self::load_from(paths, &default_sources()).await
    }

    /// Fold an explicit, ordered source list.
    pub async fn load_from(paths: &PathsConfig, sources: &[RelationSource]) -> Self {
        let loader = RelationLoader::new(FsSourceReader::new(paths.registry_dir.clone()));
        let (store, summary) = loader.build_store(sources, ID_DOCUMENT).await;
        Self {
            store: Arc::new(store),
            queue: Arc::new(InMemoryEventQueue::new()),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_load_default_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = tmp.path().join("registry");
        fs::create_dir_all(registry.join("maps")).unwrap();
        fs::write(
            registry.join("maps/node_to_room.csv"),
            "node_id,room_id\nN1,R1\nN2,R1\n",
        )
        .unwrap();
        fs::write(registry.join("ids.json"), r#"{"nodes": ["N1", "N2"]}"#).unwrap();

        let paths = PathsConfig {
            registry_dir: registry,
            events_dir: tmp.path().join("events"),
        };
        let context = BridgeContext::load(&paths).await;

        assert_eq!(context.summary.applied, 2);
        assert_eq!(context.store.get_room("R1").unwrap().members.len(), 2);
        assert!(context.store.source_document().is_some());
        assert!(context.queue.is_empty());
    }

    #[tokio::test]
    async fn test_missing_registry_yields_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            registry_dir: tmp.path().join("absent"),
            events_dir: tmp.path().join("events"),
        };
        let context = BridgeContext::load(&paths).await;

        assert_eq!(context.summary.applied, 0);
        assert_eq!(context.store.stats().nodes, 0);
        assert!(context.store.source_document().is_none());
    }
}

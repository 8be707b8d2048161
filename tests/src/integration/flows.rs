//! # Integration Test Flows
//!
//! Relation files on disk → `RelationLoader` → `RegistryStore` → queries,
//! both through the store directly and through the Registry API.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{empty_tree, full_tree, get, send, BridgeTree};
    use axum::http::StatusCode;
    use bridge_runtime::BridgeContext;
    use serde_json::json;
    use shared_bus::InMemoryEventQueue;
    use std::sync::Arc;
    use tb_01_relation_registry::{
        default_sources, FsSourceReader, Node, RelationLoader, RelationSource, ID_DOCUMENT,
    };
    use tb_02_registry_api::{build_router, ApiConfig, AppState};

    // =========================================================================
    // LOAD → QUERY
    // =========================================================================

    #[tokio::test]
    async fn test_default_sources_fold_into_store() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let store = &context.store;

        assert_eq!(context.summary.applied, 9);
        assert_eq!(context.summary.rejected, 0);

        let stats = store.stats();
        assert_eq!(
            (stats.nodes, stats.rooms, stats.chapels, stats.arcana, stats.shem),
            (3, 2, 1, 2, 2)
        );

        let n01 = store.get_node("N01").unwrap();
        assert_eq!(n01.room.as_deref(), Some("ROOM-A"));
        assert_eq!(n01.chapel.as_deref(), Some("CHAPEL-1"));
        assert_eq!(store.get_node("N02").unwrap().chapel, None);

        assert_eq!(store.get_room("ROOM-A").unwrap().members, ["N01", "N02"]);
        assert_eq!(store.get_chapel("CHAPEL-1").unwrap().members, ["N01", "N03"]);
        assert_eq!(store.get_arcana("I").unwrap().path, "12");

        // Trailing cell missing → empty virtue
        let shem = store.get_shem("2").unwrap();
        assert_eq!(shem.demon, "Agares");
        assert_eq!(shem.virtue, "");

        assert_eq!(store.source_document().unwrap()["version"], 3);
    }

    #[tokio::test]
    async fn test_every_node_reference_is_mirrored() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let store = &context.store;

        for (id, node) in store.nodes() {
            if let Some(room) = &node.room {
                assert!(store.get_room(room).unwrap().members.contains(id));
            }
            if let Some(chapel) = &node.chapel {
                assert!(store.get_chapel(chapel).unwrap().members.contains(id));
            }
        }
    }

    #[tokio::test]
    async fn test_source_order_does_not_change_nodes() {
        let tree = full_tree();
        let forward = BridgeContext::load(&tree.paths).await;

        let mut reversed_sources = default_sources();
        reversed_sources.reverse();
        let reversed = BridgeContext::load_from(&tree.paths, &reversed_sources).await;

        let collect = |ctx: &BridgeContext| -> Vec<(String, Node)> {
            ctx.store
                .nodes()
                .map(|(id, node)| (id.clone(), node.clone()))
                .collect()
        };
        assert_eq!(collect(&forward), collect(&reversed));
        assert_eq!(forward.store.stats(), reversed.store.stats());
    }

    #[tokio::test]
    async fn test_missing_sources_are_skipped() {
        let tree = empty_tree();
        tree.write("maps/node_to_room.csv", "node_id,room_id\nN09,ROOM-Z\n,ROOM-Z\n");

        let loader = RelationLoader::new(FsSourceReader::new(tree.registry().to_path_buf()));
        let delta = loader.load_relations(&default_sources()).await;

        assert_eq!(delta.len(), 2);
        assert_eq!(delta.skipped_sources.len(), 3);

        // Blank key column is rejected by the store, not the loader
        let (store, summary) = loader.build_store(&default_sources(), ID_DOCUMENT).await;
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(store.get_room("ROOM-Z").unwrap().members, ["N09"]);
        assert!(store.source_document().is_none());
    }

    #[tokio::test]
    async fn test_unknown_relation_type_ignored() {
        let tree = full_tree();
        let sources = vec![
            RelationSource::new("maps/node_to_room.csv", "node-room"),
            RelationSource::new("maps/arcana_to_paths.csv", "tarot-spread"),
        ];
        let loader = RelationLoader::new(FsSourceReader::new(tree.registry().to_path_buf()));
        let delta = loader.load_relations(&sources).await;

        assert_eq!(delta.ignored_rows, 2);
        assert_eq!(delta.len(), 3);
    }

    // =========================================================================
    // LOAD → HTTP
    // =========================================================================

    fn api(tree: &BridgeTree, context: &BridgeContext) -> axum::Router {
        let config = ApiConfig {
            paths: tree.paths.clone(),
            ..ApiConfig::default()
        };
        let state = AppState::new(
            context.store.clone(),
            Arc::new(InMemoryEventQueue::new()),
            &config,
        );
        build_router(state, &config)
    }

    #[tokio::test]
    async fn test_relations_served_from_loaded_store() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let app = api(&tree, &context);

        let (status, body) = send(&app, get("/relations/nodes/N03")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"room": "ROOM-B", "chapel": "CHAPEL-1"}));

        let (status, body) = send(&app, get("/relations/rooms/ROOM-A")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"members": ["N01", "N02"]}));

        let (status, body) = send(&app, get("/relations/shem/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"demon": "Bael", "virtue": "Vehuiah"}));

        let (status, body) = send(&app, get("/relations")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collections"]["nodes"], 3);
        assert_eq!(body["hasIds"], true);

        let (status, _) = send(&app, get("/relations/rooms/ROOM-Q")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registry_serves_relation_sources() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let app = api(&tree, &context);

        let (status, body) = send(&app, get("/registry")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "directory");
        let names: Vec<_> = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["ids.json", "maps", "notes"]);

        let (status, body) = send(&app, get("/registry/maps/angel_demon_pairs.csv")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "csv");
        assert_eq!(body["headers"], json!(["shem_id", "demon", "virtue"]));
        assert_eq!(
            body["rows"][1],
            json!({"shem_id": "2", "demon": "Agares", "virtue": ""})
        );

        let (status, body) = send(&app, get("/registry/ids.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nodes"], json!(["N01", "N02", "N03"]));

        let (status, body) = send(&app, get("/registry/maps/../../events")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid registry path");
    }
}

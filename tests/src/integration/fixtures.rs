//! On-disk registry trees shared by the integration flows.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tb_02_registry_api::PathsConfig;
use tempfile::TempDir;
use tower::ServiceExt;

pub const NODE_TO_ROOM: &str = "node_id,room_id\nN01,ROOM-A\nN02,ROOM-A\nN03,ROOM-B\n";
pub const NODE_TO_CHAPEL: &str = "node_id,chapel_id\nN01,CHAPEL-1\nN03,CHAPEL-1\n";
pub const ARCANA_TO_PATHS: &str = "arcana_id,path\n0,11\nI,12\n";
pub const SHEM_PAIRS: &str = "shem_id,demon,virtue\n1,Bael,Vehuiah\n2,Agares\n";
pub const IDS: &str = r#"{"nodes":["N01","N02","N03"],"version":3}"#;
pub const MANIFEST: &str = r#"{"realms":["cosmogenesis","codex-1499"]}"#;

/// A temporary bridge root with `registry/` and `events/` side by side.
pub struct BridgeTree {
    pub tmp: TempDir,
    pub paths: PathsConfig,
}

impl BridgeTree {
    pub fn registry(&self) -> &Path {
        &self.paths.registry_dir
    }

    pub fn events(&self) -> &Path {
        &self.paths.events_dir
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.registry().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }
}

/// Registry with every default relation source and both JSON documents.
pub fn full_tree() -> BridgeTree {
    let tmp = tempfile::tempdir().unwrap();
    let paths = PathsConfig {
        registry_dir: tmp.path().join("registry"),
        events_dir: tmp.path().join("events"),
    };
    let tree = BridgeTree { tmp, paths };
    tree.write("maps/node_to_room.csv", NODE_TO_ROOM);
    tree.write("maps/node_to_chapel.csv", NODE_TO_CHAPEL);
    tree.write("maps/arcana_to_paths.csv", ARCANA_TO_PATHS);
    tree.write("maps/angel_demon_pairs.csv", SHEM_PAIRS);
    tree.write("ids.json", IDS);
    tree.write("notes/bridge_manifest.json", MANIFEST);
    tree
}

/// Registry directory that exists but holds nothing.
pub fn empty_tree() -> BridgeTree {
    let tmp = tempfile::tempdir().unwrap();
    let paths = PathsConfig {
        registry_dir: tmp.path().join("registry"),
        events_dir: tmp.path().join("events"),
    };
    fs::create_dir_all(&paths.registry_dir).unwrap();
    BridgeTree { tmp, paths }
}

/// Send `req` through `app` and decode the JSON body (`Null` when empty).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

//! # Registry Filesystem Adapter
//!
//! All disk reads behind the HTTP surface. Callers hand in an already
//! contained `RegistryPath`; nothing here inspects raw request input.

use crate::domain::media::{decode_csv, decode_json, decode_ndjson, MediaKind, ResourceError};
use crate::domain::{
    ApiError, ApiResult, DirectoryEntry, EntryKind, PathsConfig, RegistryBody, RegistryPath,
    RegistryResource, SyncSnapshot,
};
use serde_json::Value;
use shared_bus::{QUEUE_JOURNAL_FILE, RECEIPTS_DIR};
use shared_types::iso_timestamp;
use std::path::{Path, PathBuf};
use tb_01_relation_registry::ID_DOCUMENT;
use tracing::{error, warn};

/// Manifest document, relative to the registry root.
pub const MANIFEST_DOCUMENT: &str = "notes/bridge_manifest.json";

#[derive(Debug, Clone)]
pub struct RegistryFiles {
    registry_dir: PathBuf,
    events_dir: PathBuf,
}

impl RegistryFiles {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            registry_dir: paths.registry_dir.clone(),
            events_dir: paths.events_dir.clone(),
        }
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    pub fn events_dir(&self) -> &Path {
        &self.events_dir
    }

    /// Serve whatever lives at `path`: a listing for directories, a decoded
    /// document for files.
    pub async fn entry(&self, path: &RegistryPath) -> ApiResult<RegistryBody> {
        let target = path.to_fs_path(&self.registry_dir);

        let metadata = match tokio::fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ApiError::entry_not_found(path.public_path()));
            }
            Err(e) => {
                error!(path = %target.display(), error = %e, "Registry stat failed");
                return Err(ApiError::internal());
            }
        };

        self.ensure_inside_root(&target, path).await?;

        if metadata.is_dir() {
            let entries = list_directory(&target, path).await.map_err(|e| {
                error!(path = %target.display(), error = %e, "Registry listing failed");
                ApiError::internal()
            })?;
            return Ok(RegistryBody::Resource(RegistryResource::Directory {
                path: path.public_path(),
                entries,
            }));
        }

        let extension = path.extension();
        let Some(kind) = MediaKind::from_extension(&extension) else {
            return Err(ApiError::unsupported_media_type(extension));
        };

        let text = tokio::fs::read_to_string(&target)
            .await
            .map_err(|e| resource_error(path, e.into()))?;

        match kind {
            MediaKind::Json => decode_json(&text)
                .map(RegistryBody::Document)
                .map_err(|e| resource_error(path, e)),
            MediaKind::Csv => {
                let (headers, rows) = decode_csv(&text);
                Ok(RegistryBody::Resource(RegistryResource::Csv {
                    path: path.public_path(),
                    headers,
                    rows,
                }))
            }
            MediaKind::Ndjson => decode_ndjson(&text)
                .map(|entries| {
                    RegistryBody::Resource(RegistryResource::Ndjson {
                        path: path.public_path(),
                        entries,
                    })
                })
                .map_err(|e| resource_error(path, e)),
        }
    }

    /// Symlinks resolving outside the registry root are refused like any
    /// other escape.
    async fn ensure_inside_root(&self, target: &Path, path: &RegistryPath) -> ApiResult<()> {
        let (root, resolved) = match tokio::try_join!(
            tokio::fs::canonicalize(&self.registry_dir),
            tokio::fs::canonicalize(target),
        ) {
            Ok(pair) => pair,
            Err(e) => {
                error!(path = %target.display(), error = %e, "Registry canonicalize failed");
                return Err(ApiError::internal());
            }
        };

        if resolved.starts_with(&root) {
            Ok(())
        } else {
            warn!(
                path = %path.public_path(),
                resolved = %resolved.display(),
                "Registry entry resolves outside the root"
            );
            Err(ApiError::invalid_path())
        }
    }

    /// Best-effort consolidated snapshot. Each part is read concurrently and
    /// degrades to an empty value on its own.
    pub async fn sync_snapshot(&self) -> SyncSnapshot {
        let ids_path = self.registry_dir.join(ID_DOCUMENT);
        let manifest_path = self.registry_dir.join(MANIFEST_DOCUMENT);
        let queue_path = self.events_dir.join(QUEUE_JOURNAL_FILE);
        let receipts_path = self.events_dir.join(RECEIPTS_DIR);

        let (ids, manifest, pending_events, receipts) = tokio::join!(
            read_optional_json(&ids_path),
            read_optional_json(&manifest_path),
            read_optional_ndjson(&queue_path),
            list_receipts(&receipts_path),
        );

        SyncSnapshot {
            status: "ok",
            generated_at: iso_timestamp(),
            ids,
            manifest,
            pending_events,
            receipts,
        }
    }
}

fn resource_error(path: &RegistryPath, e: ResourceError) -> ApiError {
    match e {
        ResourceError::NotFound => ApiError::entry_not_found(path.public_path()),
        ResourceError::InvalidJson => {
            warn!(path = %path.public_path(), "Malformed registry JSON");
            ApiError::malformed(path.public_path())
        }
        ResourceError::InvalidNdjsonLine { line } => {
            warn!(path = %path.public_path(), line, "Malformed registry NDJSON");
            ApiError::malformed(path.public_path()).with_field("line", line)
        }
        ResourceError::Io(reason) => {
            error!(path = %path.public_path(), error = %reason, "Registry read failed");
            ApiError::internal()
        }
    }
}

/// Non-hidden children of `dir`, sorted by name.
pub async fn list_directory(
    dir: &Path,
    base: &RegistryPath,
) -> std::io::Result<Vec<DirectoryEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let kind = if entry.file_type().await?.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(DirectoryEntry {
            path: base.child(&name).public_path(),
            name,
            kind,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

async fn read_text(path: &Path) -> Result<String, ResourceError> {
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Missing → `null`; unreadable or malformed → `null` with a warning.
async fn read_optional_json(path: &Path) -> Value {
    match read_text(path).await.and_then(|text| decode_json(&text)) {
        Ok(value) => value,
        Err(ResourceError::NotFound) => Value::Null,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Snapshot document unavailable");
            Value::Null
        }
    }
}

/// Missing → `[]`; unreadable or malformed → `[]` with a warning.
async fn read_optional_ndjson(path: &Path) -> Vec<Value> {
    match read_text(path).await.and_then(|text| decode_ndjson(&text)) {
        Ok(entries) => entries,
        Err(ResourceError::NotFound) => Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Snapshot queue unavailable");
            Vec::new()
        }
    }
}

/// Sorted receipt file names. Hidden files and subdirectories are skipped.
async fn list_receipts(dir: &Path) -> Vec<String> {
    match receipt_names(dir).await {
        Ok(names) => names,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Receipt listing unavailable");
            Vec::new()
        }
    }
}

async fn receipt_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') && entry.file_type().await?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, RegistryFiles) {
        let tmp = tempfile::tempdir().unwrap();
        let registry = tmp.path().join("registry");
        let events = tmp.path().join("events");
        fs::create_dir_all(registry.join("maps")).unwrap();
        fs::create_dir_all(registry.join("notes")).unwrap();
        fs::write(registry.join("ids.json"), r#"{"nodes":["n1"]}"#).unwrap();
        fs::write(registry.join("maps/node_to_room.csv"), "node_id,room_id\nn1,r1\n").unwrap();
        fs::write(registry.join("notes/log.ndjson"), "{\"a\":1}\n{\"a\":2}\n").unwrap();
        fs::write(registry.join("notes/bad.ndjson"), "{\"a\":1}\nnope\n").unwrap();
        fs::write(registry.join("notes/readme.txt"), "hi").unwrap();
        fs::write(registry.join(".secret"), "x").unwrap();

        let files = RegistryFiles::new(&PathsConfig {
            registry_dir: registry,
            events_dir: events,
        });
        (tmp, files)
    }

    fn body(result: ApiResult<RegistryBody>) -> Value {
        serde_json::to_value(result.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_root_listing_sorted_and_hides_dotfiles() {
        let (_tmp, files) = fixture();
        let value = body(files.entry(&RegistryPath::root()).await);
        assert_eq!(value["type"], "directory");
        assert_eq!(value["path"], "/registry");
        let names: Vec<_> = value["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["ids.json", "maps", "notes"]);
        assert_eq!(value["entries"][1]["type"], "directory");
        assert_eq!(value["entries"][1]["path"], "/registry/maps");
    }

    #[tokio::test]
    async fn test_media_negotiation() {
        let (_tmp, files) = fixture();

        let ids = body(files.entry(&RegistryPath::resolve("ids.json").unwrap()).await);
        assert_eq!(ids, json!({"nodes": ["n1"]}));

        let csv = body(
            files
                .entry(&RegistryPath::resolve("maps/node_to_room.csv").unwrap())
                .await,
        );
        assert_eq!(
            csv,
            json!({
                "type": "csv",
                "path": "/registry/maps/node_to_room.csv",
                "headers": ["node_id", "room_id"],
                "rows": [{"node_id": "n1", "room_id": "r1"}]
            })
        );

        let ndjson = body(files.entry(&RegistryPath::resolve("notes/log.ndjson").unwrap()).await);
        assert_eq!(ndjson["entries"], json!([{"a": 1}, {"a": 2}]));
    }

    #[tokio::test]
    async fn test_entry_errors() {
        let (_tmp, files) = fixture();

        let err = files
            .entry(&RegistryPath::resolve("maps/none.csv").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body()["path"], "/registry/maps/none.csv");

        let err = files
            .entry(&RegistryPath::resolve("notes/readme.txt").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.body()["extension"], ".txt");

        let err = files
            .entry(&RegistryPath::resolve("notes/bad.ndjson").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["error"], "Malformed registry resource");
        assert_eq!(err.body()["line"], 2);
    }

    #[tokio::test]
    async fn test_sync_with_missing_event_files() {
        let (_tmp, files) = fixture();
        let snapshot = files.sync_snapshot().await;
        assert_eq!(snapshot.status, "ok");
        assert_eq!(snapshot.ids, json!({"nodes": ["n1"]}));
        assert_eq!(snapshot.manifest, Value::Null);
        assert!(snapshot.pending_events.is_empty());
        assert!(snapshot.receipts.is_empty());
    }

    #[tokio::test]
    async fn test_sync_reads_queue_and_receipts() {
        let (_tmp, files) = fixture();
        let events = files.events_dir().to_path_buf();
        fs::create_dir_all(events.join("receipts/nested")).unwrap();
        fs::write(events.join("receipts/EVT-2-2.json"), "{}").unwrap();
        fs::write(events.join("receipts/EVT-1-1.json"), "{}").unwrap();
        fs::write(events.join("receipts/.keep"), "").unwrap();
        fs::write(events.join("queue.ndjson"), "{\"id\":\"EVT-3-3\"}\n").unwrap();
        fs::write(files.registry_dir().join(MANIFEST_DOCUMENT), "{broken").unwrap();

        let snapshot = files.sync_snapshot().await;
        assert_eq!(snapshot.receipts, vec!["EVT-1-1.json", "EVT-2-2.json"]);
        assert_eq!(snapshot.pending_events, vec![json!({"id": "EVT-3-3"})]);
        assert_eq!(snapshot.manifest, Value::Null);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_outside_root_rejected() {
        let (tmp, files) = fixture();
        let outside = tmp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("secret.json"), r#"{"leak": true}"#).unwrap();
        std::os::unix::fs::symlink(&outside, files.registry_dir().join("link")).unwrap();

        let err = files
            .entry(&RegistryPath::resolve("link/secret.json").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = files
            .entry(&RegistryPath::resolve("link").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_root_served() {
        let (_tmp, files) = fixture();
        std::os::unix::fs::symlink(
            files.registry_dir().join("maps"),
            files.registry_dir().join("alias"),
        )
        .unwrap();

        let value = body(
            files
                .entry(&RegistryPath::resolve("alias/node_to_room.csv").unwrap())
                .await,
        );
        assert_eq!(value["type"], "csv");
        assert_eq!(value["path"], "/registry/alias/node_to_room.csv");
    }
}

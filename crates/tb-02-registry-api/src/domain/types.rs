//! Response and request bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
}

/// Wrapped registry responses, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryResource {
    Directory {
        path: String,
        entries: Vec<DirectoryEntry>,
    },
    Csv {
        path: String,
        headers: Vec<String>,
        rows: Vec<Value>,
    },
    Ndjson {
        path: String,
        entries: Vec<Value>,
    },
}

/// Body of every `GET /registry/...` that hits something. JSON documents are
/// returned as-is, without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegistryBody {
    Resource(RegistryResource),
    Document(Value),
}

/// `GET /sync` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub status: &'static str,
    pub generated_at: String,
    pub ids: Value,
    pub manifest: Value,
    pub pending_events: Vec<Value>,
    pub receipts: Vec<String>,
}

/// `POST /events` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAccepted {
    pub id: String,
}

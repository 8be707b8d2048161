//! Registry media types and their decoders.
//!
//! Decoders work on text already read from disk; I/O lives in
//! `adapters::registry_fs`.

use serde_json::{Map, Value};
use tb_01_relation_registry::parse_table;
use thiserror::Error;

/// File kinds the registry knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Json,
    Csv,
    Ndjson,
}

impl MediaKind {
    /// Match a lower-cased extension including its dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".json" => Some(Self::Json),
            ".csv" => Some(Self::Csv),
            ".ndjson" => Some(Self::Ndjson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource not found")]
    NotFound,
    #[error("resource unreadable: {0}")]
    Io(String),
    #[error("invalid JSON document")]
    InvalidJson,
    /// 1-based line number of the first bad record.
    #[error("invalid JSON on line {line}")]
    InvalidNdjsonLine { line: usize },
}

impl From<std::io::Error> for ResourceError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Io(e.to_string()),
        }
    }
}

pub fn decode_json(text: &str) -> Result<Value, ResourceError> {
    serde_json::from_str(text).map_err(|_| ResourceError::InvalidJson)
}

/// Parse a table into `(headers, rows)` where each row is an object keyed by
/// header.
pub fn decode_csv(text: &str) -> (Vec<String>, Vec<Value>) {
    let table = parse_table(text);
    let rows = table
        .rows
        .iter()
        .map(|cells| {
            let record: Map<String, Value> = table
                .headers
                .iter()
                .zip(cells)
                .map(|(h, c)| (h.clone(), Value::String(c.clone())))
                .collect();
            Value::Object(record)
        })
        .collect();
    (table.headers, rows)
}

/// One JSON value per non-blank line.
pub fn decode_ndjson(text: &str) -> Result<Vec<Value>, ResourceError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|_| ResourceError::InvalidNdjsonLine { line: idx + 1 })
        })
        .collect()
}

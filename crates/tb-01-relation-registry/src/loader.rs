//! # Relation Loader
//!
//! Turns an ordered list of relation sources into a `RegistryDelta`. A source
//! that cannot be read is skipped with a warning; the load itself never fails.

use crate::domain::{
    parse_table, LoadSummary, RegistryDelta, RegistryError, RegistryStore, RelationType,
};
use crate::ports::SourceReader;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// One relation file and the relation type its rows carry.
///
/// The type is kept as a plain string so unrecognised types survive
/// configuration and are dropped row by row at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSource {
    pub location: String,
    #[serde(rename = "type")]
    pub relation_type: String,
}

impl RelationSource {
    pub fn new(location: impl Into<String>, relation_type: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            relation_type: relation_type.into(),
        }
    }
}

/// The four relation files every registry ships with.
#[must_use]
pub fn default_sources() -> Vec<RelationSource> {
    vec![
        RelationSource::new("maps/node_to_room.csv", RelationType::NodeRoom.as_str()),
        RelationSource::new("maps/node_to_chapel.csv", RelationType::NodeChapel.as_str()),
        RelationSource::new("maps/arcana_to_paths.csv", RelationType::ArcanaPath.as_str()),
        RelationSource::new("maps/angel_demon_pairs.csv", RelationType::Shem.as_str()),
    ]
}

pub struct RelationLoader<R: SourceReader> {
    reader: R,
}

impl<R: SourceReader> RelationLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read and parse every source, in order.
    pub async fn load_relations(&self, sources: &[RelationSource]) -> RegistryDelta {
        let mut delta = RegistryDelta::default();

        for source in sources {
            let text = match self.reader.read_text(&source.location).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(location = %source.location, error = %e, "Skipping relation source");
                    delta.skipped_sources.push(source.location.clone());
                    continue;
                }
            };

            let table = parse_table(&text);
            let relation = source.relation_type.parse::<RelationType>().ok();
            for row in table.records() {
                match relation {
                    Some(relation) => delta.entries.push((relation, row)),
                    None => delta.ignored_rows += 1,
                }
            }

            if let Some(relation) = relation {
                let missing: Vec<&str> = relation
                    .expected_headers()
                    .iter()
                    .copied()
                    .filter(|h| !table.headers.iter().any(|found| found == h))
                    .collect();
                if !missing.is_empty() {
                    warn!(
                        location = %source.location,
                        relation_type = %relation,
                        missing = ?missing,
                        found = ?table.headers,
                        "Relation source headers do not match"
                    );
                    delta.mismatched_sources.push(source.location.clone());
                }
            }

            match relation {
                Some(_) => debug!(
                    location = %source.location,
                    rows = table.rows.len(),
                    "Relation source parsed"
                ),
                None => warn!(
                    location = %source.location,
                    relation_type = %source.relation_type,
                    rows = table.rows.len(),
                    "Ignoring rows of unknown relation type"
                ),
            }
        }

        delta
    }

    /// Read the primary identifier document.
    ///
    /// # Errors
    ///
    /// Whatever the reader reports, or `MalformedDocument` for invalid JSON.
    pub async fn load_source_document(&self, location: &str) -> Result<Value, RegistryError> {
        let text = self.reader.read_text(location).await?;
        serde_json::from_str(&text).map_err(|e| RegistryError::MalformedDocument {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load `sources` and `id_document` into a fresh store.
    ///
    /// A missing or malformed identifier document leaves the store without
    /// one and is logged.
    pub async fn build_store(
        &self,
        sources: &[RelationSource],
        id_document: &str,
    ) -> (RegistryStore, LoadSummary) {
        let delta = self.load_relations(sources).await;
        let mut store = RegistryStore::new();
        let summary = store.apply_delta(&delta);

        match self.load_source_document(id_document).await {
            Ok(document) => store.set_source_document(document),
            Err(e) => warn!(location = id_document, error = %e, "Identifier document unavailable"),
        }

        let stats = store.stats();
        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            skipped_sources = delta.skipped_sources.len(),
            ignored_rows = delta.ignored_rows,
            nodes = stats.nodes,
            rooms = stats.rooms,
            chapels = stats.chapels,
            arcana = stats.arcana,
            shem = stats.shem,
            "Registry built"
        );
        (store, summary)
    }
}

//! # Registry Store
//!
//! Five keyed collections folded from relation rows. Writes only happen while
//! the store is being built; afterwards it is frozen behind an `Arc` and read
//! without locking.

use super::entities::{ArcanaEntry, Chapel, Node, RelationRow, RelationType, Room, ShemPair};
use super::errors::RegistryError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Rows produced by one loader pass, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDelta {
    pub entries: Vec<(RelationType, RelationRow)>,
    /// Source locations that were missing or unreadable.
    pub skipped_sources: Vec<String>,
    /// Rows dropped because their source named an unknown relation type.
    pub ignored_rows: usize,
    /// Source locations whose header row lacks a column its relation type expects.
    pub mismatched_sources: Vec<String>,
}

impl RegistryDelta {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of folding a delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Collection sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub nodes: usize,
    pub rooms: usize,
    pub chapels: usize,
    pub arcana: usize,
    pub shem: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryStore {
    nodes: BTreeMap<String, Node>,
    rooms: BTreeMap<String, Room>,
    chapels: BTreeMap<String, Chapel>,
    arcana: BTreeMap<String, ArcanaEntry>,
    shem: BTreeMap<String, ShemPair>,
    source_document: Option<Value>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one relation row.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when a key column is absent or blank. The store is
    /// left untouched in that case.
    pub fn apply_row(
        &mut self,
        relation: RelationType,
        row: &RelationRow,
    ) -> Result<(), RegistryError> {
        match relation {
            RelationType::NodeRoom => {
                let node_id = key(row, relation, "node_id")?;
                let room_id = key(row, relation, "room_id")?;
                self.apply_node_room(node_id, room_id);
            }
            RelationType::NodeChapel => {
                let node_id = key(row, relation, "node_id")?;
                let chapel_id = key(row, relation, "chapel_id")?;
                self.apply_node_chapel(node_id, chapel_id);
            }
            RelationType::ArcanaPath => {
                let arcana_id = key(row, relation, "arcana_id")?;
                self.arcana.insert(
                    arcana_id.to_string(),
                    ArcanaEntry {
                        path: row.get_or_empty("path").to_string(),
                    },
                );
            }
            RelationType::Shem => {
                let shem_id = key(row, relation, "shem_id")?;
                self.shem.insert(
                    shem_id.to_string(),
                    ShemPair {
                        demon: row.get_or_empty("demon").to_string(),
                        virtue: row.get_or_empty("virtue").to_string(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Fold every entry of `delta` in order. Rejected rows are logged and
    /// counted; they never stop the fold.
    pub fn apply_delta(&mut self, delta: &RegistryDelta) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for (relation, row) in &delta.entries {
            match self.apply_row(*relation, row) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(relation = %relation, error = %e, "Skipping malformed relation row");
                    summary.rejected += 1;
                }
            }
        }
        summary
    }

    fn apply_node_room(&mut self, node_id: &str, room_id: &str) {
        self.nodes.entry(node_id.to_string()).or_default().room = Some(room_id.to_string());
        add_member(
            &mut self.rooms.entry(room_id.to_string()).or_default().members,
            node_id,
        );
    }

    fn apply_node_chapel(&mut self, node_id: &str, chapel_id: &str) {
        self.nodes.entry(node_id.to_string()).or_default().chapel = Some(chapel_id.to_string());
        add_member(
            &mut self.chapels.entry(chapel_id.to_string()).or_default().members,
            node_id,
        );
    }

    pub fn set_source_document(&mut self, document: Value) {
        self.source_document = Some(document);
    }

    /// The primary identifier document, verbatim.
    #[must_use]
    pub fn source_document(&self) -> Option<&Value> {
        self.source_document.as_ref()
    }

    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn get_room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    #[must_use]
    pub fn get_chapel(&self, id: &str) -> Option<&Chapel> {
        self.chapels.get(id)
    }

    #[must_use]
    pub fn get_arcana(&self, id: &str) -> Option<&ArcanaEntry> {
        self.arcana.get(id)
    }

    #[must_use]
    pub fn get_shem(&self, id: &str) -> Option<&ShemPair> {
        self.shem.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            nodes: self.nodes.len(),
            rooms: self.rooms.len(),
            chapels: self.chapels.len(),
            arcana: self.arcana.len(),
            shem: self.shem.len(),
        }
    }
}

fn key<'a>(
    row: &'a RelationRow,
    relation: RelationType,
    column: &'static str,
) -> Result<&'a str, RegistryError> {
    match row.get(column) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RegistryError::MissingColumn {
            relation: relation.as_str(),
            column,
        }),
    }
}

fn add_member(members: &mut Vec<String>, node_id: &str) {
    if !members.iter().any(|m| m == node_id) {
        members.push(node_id.to_string());
    }
}

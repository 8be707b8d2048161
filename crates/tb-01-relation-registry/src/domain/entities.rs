//! Registry entities and relation rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A node and the (at most one) room and chapel it currently belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapel: Option<String>,
}

/// A room and every node that has referenced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub members: Vec<String>,
}

/// A chapel and every node that has referenced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapel {
    pub members: Vec<String>,
}

/// Path descriptor for one arcana id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcanaEntry {
    pub path: String,
}

/// Demon/virtue pair for one shem id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShemPair {
    pub demon: String,
    pub virtue: String,
}

/// Kinds of relation file the store knows how to fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    #[serde(rename = "node-room")]
    NodeRoom,
    #[serde(rename = "node-chapel")]
    NodeChapel,
    #[serde(rename = "arcana-path")]
    ArcanaPath,
    #[serde(rename = "shem")]
    Shem,
}

impl RelationType {
    /// All known relation types.
    pub const ALL: [RelationType; 4] = [
        Self::NodeRoom,
        Self::NodeChapel,
        Self::ArcanaPath,
        Self::Shem,
    ];

    /// Wire name used in source lists.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeRoom => "node-room",
            Self::NodeChapel => "node-chapel",
            Self::ArcanaPath => "arcana-path",
            Self::Shem => "shem",
        }
    }

    /// Header names the relation file is expected to carry.
    #[must_use]
    pub fn expected_headers(&self) -> &'static [&'static str] {
        match self {
            Self::NodeRoom => &["node_id", "room_id"],
            Self::NodeChapel => &["node_id", "chapel_id"],
            Self::ArcanaPath => &["arcana_id", "path"],
            Self::Shem => &["shem_id", "demon", "virtue"],
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown relation type: {s}"))
    }
}

/// One data line of a relation file, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationRow(BTreeMap<String, String>);

impl RelationRow {
    /// Build a row from `(header, value)` pairs. A repeated header keeps the
    /// last value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Value under `column`, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Value under `column`, or `""`.
    #[must_use]
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_type_round_trip_names() {
        for t in RelationType::ALL {
            assert_eq!(t.as_str().parse::<RelationType>().unwrap(), t);
        }
        assert!("node-altar".parse::<RelationType>().is_err());
    }

    #[test]
    fn test_node_serialization_omits_absent() {
        let node = Node {
            room: Some("r1".into()),
            chapel: None,
        };
        assert_eq!(serde_json::to_value(&node).unwrap(), serde_json::json!({"room": "r1"}));
    }

    #[test]
    fn test_row_lookup() {
        let row = RelationRow::from_pairs([("node_id", "n1"), ("room_id", "r1")]);
        assert_eq!(row.get("node_id"), Some("n1"));
        assert_eq!(row.get("chapel_id"), None);
        assert_eq!(row.get_or_empty("chapel_id"), "");
    }
}

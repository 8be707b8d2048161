//! Comma-delimited table parsing.
//!
//! Deliberately minimal: no quoting and no escapes. A field that contains a
//! comma is split like any other.

use super::entities::RelationRow;
use serde::{Deserialize, Serialize};

/// Parsed table: trimmed headers plus one cell vector per data line.
///
/// Every row has exactly `headers.len()` cells. Missing trailing cells are
/// `""`; surplus cells are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Rows keyed by header name.
    pub fn records(&self) -> impl Iterator<Item = RelationRow> + '_ {
        self.rows.iter().map(|cells| {
            RelationRow::from_pairs(
                self.headers
                    .iter()
                    .zip(cells.iter())
                    .map(|(h, v)| (h.clone(), v.clone())),
            )
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Parse comma-delimited text. Blank lines are skipped, the first remaining
/// line is the header row.
#[must_use]
pub fn parse_table(text: &str) -> TableData {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(header_line) = lines.next() else {
        return TableData::default();
    };
    let headers: Vec<String> = split_cells(header_line).collect();

    let rows = lines
        .map(|line| {
            let mut cells: Vec<String> = split_cells(line).take(headers.len()).collect();
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    TableData { headers, rows }
}

fn split_cells(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(',').map(|c| c.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = parse_table("node_id,room_id\nn1,r1\nn2,r2\n");
        assert_eq!(table.headers, vec!["node_id", "room_id"]);
        assert_eq!(table.rows, vec![vec!["n1", "r1"], vec!["n2", "r2"]]);
    }

    #[test]
    fn test_crlf_blank_lines_and_whitespace() {
        let table = parse_table("\r\n  shem_id , demon ,virtue \r\n\r\n 1, Vassago ,Vehuiah\r\n   \r\n");
        assert_eq!(table.headers, vec!["shem_id", "demon", "virtue"]);
        assert_eq!(table.rows, vec![vec!["1", "Vassago", "Vehuiah"]]);
    }

    #[test]
    fn test_short_and_long_rows() {
        let table = parse_table("a,b,c\n1\n1,2,3,4,5");
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_no_quoting_support() {
        let table = parse_table("arcana_id,path\n0,\"a,b\"");
        assert_eq!(table.rows[0], vec!["0", "\"a"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_table("").is_empty());
        assert!(parse_table("\n  \n").is_empty());
    }

    #[test]
    fn test_records_zip_headers() {
        let table = parse_table("node_id,room_id\nn1,r1");
        let rows: Vec<_> = table.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("node_id"), Some("n1"));
        assert_eq!(rows[0].get("room_id"), Some("r1"));
    }
}

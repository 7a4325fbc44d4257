use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ir::{Connection, ConnectionKind, ConnectionMeta, Station};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1[0-9]{3}|20[0-9]{2})\b").unwrap());

/// A connection as delivered by the acquisition layer, relative to the
/// station that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub target_id: String,
    #[serde(default)]
    pub metadata: ConnectionMeta,
}

/// One fully resolved station plus the connections discovered with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub origin_year: Option<i32>,
    /// Free-form start date ("1962", "1962-05-01", "c. 1962").
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

impl StationRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            origin_year: None,
            begin: None,
            connections: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.origin_year = Some(year);
        self
    }

    pub fn connect(mut self, kind: ConnectionKind, target: impl Into<String>) -> Self {
        self.connections.push(ConnectionRecord {
            kind,
            target_id: target.into(),
            metadata: ConnectionMeta::default(),
        });
        self
    }

    /// Explicit year first, otherwise the first plausible year in `begin`.
    pub fn resolved_year(&self) -> Option<i32> {
        self.origin_year
            .or_else(|| self.begin.as_deref().and_then(extract_year))
    }

    pub fn to_station(&self) -> Station {
        Station {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            origin_year: self.resolved_year(),
            x: 0,
            y: 0,
        }
    }

    pub fn connection_to(&self, record: &ConnectionRecord) -> Connection {
        Connection {
            from: self.id.clone(),
            to: record.target_id.clone(),
            kind: record.kind,
            metadata: record.metadata.clone(),
        }
    }
}

pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A connection whose target is not on the map yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConnection {
    pub source_id: String,
    pub connection: Connection,
}

impl PendingConnection {
    pub fn target_id(&self) -> &str {
        &self.connection.to
    }
}

/// Reads either a JSON array of station records or a single record.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<StationRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|record| vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_comes_from_begin_when_missing() {
        let mut record = StationRecord::new("a", "A");
        record.begin = Some("1962-05-01".to_string());
        assert_eq!(record.resolved_year(), Some(1962));
        record.origin_year = Some(1970);
        assert_eq!(record.resolved_year(), Some(1970));
    }

    #[test]
    fn extract_year_skips_non_years() {
        assert_eq!(extract_year("c. 1958"), Some(1958));
        assert_eq!(extract_year("catalogue 12345"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn parses_record_batches() {
        let json = r#"[
            {"id": "a", "name": "A", "originYear": 1960},
            {"id": "b", "name": "B", "begin": "1965",
             "connections": [{"type": "membership", "targetId": "a",
                              "metadata": {"role": "bass", "titles": ["One"]}}]}
        ]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].resolved_year(), Some(1965));
        let conn = records[1].connection_to(&records[1].connections[0]);
        assert_eq!(conn.from, "b");
        assert_eq!(conn.to, "a");
        assert_eq!(conn.metadata.role.as_deref(), Some("bass"));

        let single = parse_records(r#"{"id": "z", "name": "Z"}"#).unwrap();
        assert_eq!(single[0].id, "z");
    }
}

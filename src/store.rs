use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{MetroError, MetroResult};
use crate::ir::{Connection, GridPoint, Snapshot, Station};

/// Owns the stations and connections of one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStore {
    entities: BTreeMap<String, Station>,
    relationships: Vec<Connection>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entities: snapshot.entities,
            relationships: snapshot.relationships,
        }
    }

    /// Parses a persisted snapshot. Anything missing `entities` or
    /// `relationships` is rejected as a whole.
    pub fn parse_snapshot(json: &str) -> MetroResult<Snapshot> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| MetroError::MalformedSnapshot(err.to_string()))?;
        for key in ["entities", "relationships"] {
            if value.get(key).is_none() {
                return Err(MetroError::MalformedSnapshot(format!("missing '{key}'")));
            }
        }
        serde_json::from_value(value).map_err(|err| MetroError::MalformedSnapshot(err.to_string()))
    }

    /// Loads a snapshot, falling back to an empty graph when it is malformed.
    /// The error is handed back so callers can surface it.
    pub fn load_or_empty(json: &str) -> (Self, Option<MetroError>) {
        match Self::parse_snapshot(json) {
            Ok(snapshot) => (Self::from_snapshot(snapshot), None),
            Err(err) => {
                warn!(error = %err, "discarding snapshot, starting from an empty map");
                (Self::new(), Some(err))
            }
        }
    }

    pub fn add_station(&mut self, station: Station, connections: Vec<Connection>) -> MetroResult<()> {
        if self.entities.contains_key(&station.id) {
            return Err(MetroError::DuplicateEntity(station.id));
        }
        debug!(id = %station.id, connections = connections.len(), "adding station");
        self.entities.insert(station.id.clone(), station);
        self.relationships.extend(connections);
        Ok(())
    }

    /// Removes a station and every connection naming it. Returns false when
    /// the id was not present.
    pub fn remove_station(&mut self, id: &str) -> bool {
        if self.entities.remove(id).is_none() {
            return false;
        }
        let before = self.relationships.len();
        self.relationships.retain(|conn| !conn.touches(id));
        debug!(id, dropped = before - self.relationships.len(), "removed station");
        true
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.relationships.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entities: self.entities.clone(),
            relationships: self.relationships.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.entities = snapshot.entities.clone();
        self.relationships = snapshot.relationships.clone();
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.entities.values()
    }

    pub fn entities(&self) -> &BTreeMap<String, Station> {
        &self.entities
    }

    pub fn connections(&self) -> &[Connection] {
        &self.relationships
    }

    pub fn connections_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.relationships.iter().filter(move |conn| conn.touches(id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Writes layout output back onto the stations. Ids without a station are ignored.
    pub fn set_positions(&mut self, positions: &BTreeMap<String, GridPoint>) {
        for (id, point) in positions {
            if let Some(station) = self.entities.get_mut(id) {
                station.x = point.x;
                station.y = point.y;
            }
        }
    }
}

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::{MetroError, MetroResult};
use crate::history::EditHistory;
use crate::ingest::{PendingConnection, StationRecord};
use crate::ir::{Connection, GridPoint, Snapshot};
use crate::layout::{self, Highlight, MetroLayout, hub_position};
use crate::route::{self, RouteStep};
use crate::store::GraphStore;
use crate::viewport::{MiniMap, Viewport};

const DEFAULT_SCREEN_WIDTH: f32 = 1200.0;
const DEFAULT_SCREEN_HEIGHT: f32 = 800.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    /// Connections from the record whose target was already on the map.
    pub connected: usize,
    /// Connections kept aside because their target is not on the map yet.
    pub pending: usize,
    /// Earlier pending connections that now point at the new station.
    pub promoted: usize,
    /// Hub cell the station was created at, before the spiral pass.
    pub hub: GridPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRoute {
    pub start: String,
    pub end: String,
    pub steps: Vec<RouteStep>,
}

/// One editing session over a map: graph, undo history, viewport, selection
/// and the active route.
#[derive(Debug, Clone)]
pub struct MetroSession {
    store: GraphStore,
    history: EditHistory,
    config: LayoutConfig,
    viewport: Viewport,
    selected: Option<String>,
    route: Option<ActiveRoute>,
    pending: Vec<PendingConnection>,
}

impl MetroSession {
    pub fn new(config: LayoutConfig) -> Self {
        let viewport = Viewport::new(DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT, &config);
        Self {
            store: GraphStore::new(),
            history: EditHistory::with_capacity(config.history_capacity),
            config,
            viewport,
            selected: None,
            route: None,
            pending: Vec::new(),
        }
    }

    pub fn with_screen(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport::new(width, height, &self.config);
        self
    }

    pub fn from_snapshot(snapshot: Snapshot, config: LayoutConfig) -> Self {
        let mut session = Self::new(config);
        session.store = GraphStore::from_snapshot(snapshot);
        session
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn active_route(&self) -> Option<&ActiveRoute> {
        self.route.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Connections waiting for their target: source on the map, target not.
    pub fn pending(&self) -> impl Iterator<Item = &PendingConnection> {
        self.pending.iter().filter(|pending| {
            self.store.contains(&pending.source_id) && !self.store.contains(pending.target_id())
        })
    }

    /// Adds one station with the connections discovered alongside it, then
    /// re-runs the grid layout over the whole map.
    pub fn add_station(&mut self, record: StationRecord) -> MetroResult<AddOutcome> {
        if self.store.contains(&record.id) {
            warn!(id = %record.id, "station already on the map");
            return Err(MetroError::DuplicateEntity(record.id));
        }

        let mut batch: Vec<Connection> = Vec::new();
        let mut waiting: Vec<PendingConnection> = Vec::new();
        for connection_record in &record.connections {
            let connection = record.connection_to(connection_record);
            if connection.is_self_loop() {
                continue;
            }
            if self.store.contains(&connection.to) {
                batch.push(connection);
            } else {
                waiting.push(PendingConnection {
                    source_id: record.id.clone(),
                    connection,
                });
            }
        }
        let connected = batch.len();
        let hub = hub_position(&batch, &self.config.hubs);

        let mut promoted = 0;
        for pending in &self.pending {
            if pending.target_id() != record.id || !self.store.contains(&pending.source_id) {
                continue;
            }
            let duplicate = batch
                .iter()
                .any(|conn| conn.kind == pending.connection.kind && conn.same_pair(&pending.connection));
            if duplicate {
                continue;
            }
            batch.push(pending.connection.clone());
            promoted += 1;
        }

        let placed: BTreeSet<String> = self.store.entities().keys().cloned().collect();
        let mut station = record.to_station();
        station.x = hub.x;
        station.y = hub.y;

        self.history.push(&self.store);
        self.store.add_station(station, batch)?;
        self.pending.retain(|pending| pending.source_id != record.id);
        self.pending.extend(waiting.iter().cloned());
        self.relayout(&placed);

        info!(
            id = %record.id,
            connected,
            pending = waiting.len(),
            promoted,
            "station added"
        );
        Ok(AddOutcome {
            connected,
            pending: waiting.len(),
            promoted,
            hub,
        })
    }

    /// Removes a station and every connection naming it.
    pub fn remove_station(&mut self, id: &str) -> MetroResult<()> {
        if !self.store.contains(id) {
            return Err(MetroError::UnknownEntity(id.to_string()));
        }
        self.history.push(&self.store);
        self.store.remove_station(id);
        self.reconcile();
        Ok(())
    }

    /// Empties the map. Returns false when it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.store.is_empty() && self.store.connections().is_empty() {
            return false;
        }
        self.history.push(&self.store);
        self.store.clear();
        self.selected = None;
        self.route = None;
        true
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo(&mut self.store);
        if moved {
            self.reconcile();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo(&mut self.store);
        if moved {
            self.reconcile();
        }
        moved
    }

    pub fn select(&mut self, id: &str) -> MetroResult<()> {
        if !self.store.contains(id) {
            return Err(MetroError::UnknownEntity(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Searches for a route and makes it the active one. Unknown ids are an
    /// error; an unreachable or identical pair clears the route and yields `None`.
    pub fn find_route(&mut self, start: &str, end: &str) -> MetroResult<Option<&ActiveRoute>> {
        for id in [start, end] {
            if !self.store.contains(id) {
                return Err(MetroError::UnknownEntity(id.to_string()));
            }
        }
        self.route = self.search(start, end).map(|steps| ActiveRoute {
            start: start.to_string(),
            end: end.to_string(),
            steps,
        });
        Ok(self.route.as_ref())
    }

    pub fn clear_route(&mut self) {
        self.route = None;
    }

    pub fn highlight(&self) -> Highlight {
        Highlight {
            selected: self.selected.clone(),
            route: self
                .route
                .as_ref()
                .map(|active| route::route_highlight(&active.start, &active.steps)),
        }
    }

    pub fn scene(&self) -> MetroLayout {
        layout::compute_layout(&self.store, &self.config, &self.highlight())
    }

    /// Frames the whole map in the viewport at `aspect_ratio`.
    pub fn fit_view(&mut self, aspect_ratio: f32) -> bool {
        let scene = self.scene();
        let padding = self.config.fit_padding;
        self.viewport
            .fit_to_content(scene.station_positions(), aspect_ratio, padding)
    }

    pub fn minimap(&self) -> Option<MiniMap> {
        MiniMap::from_content(self.scene().station_positions(), &self.config)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.store.snapshot())
    }

    /// Replaces the session with a persisted snapshot. A malformed snapshot
    /// leaves an empty map and the error is returned for the caller to show.
    pub fn load_snapshot_json(&mut self, json: &str) -> MetroResult<()> {
        let (store, error) = GraphStore::load_or_empty(json);
        self.store = store;
        self.history.clear();
        self.pending.clear();
        self.selected = None;
        self.route = None;
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn search(&self, start: &str, end: &str) -> Option<Vec<RouteStep>> {
        route::search(
            &self.store,
            start,
            end,
            self.config.max_route_depth,
            self.config.route_search,
        )
    }

    fn relayout(&mut self, placed: &BTreeSet<String>) {
        let positions = layout::arrange(&self.store, placed, &self.config);
        self.store.set_positions(&positions);
    }

    // Drops selection and route state that no longer matches the store.
    fn reconcile(&mut self) {
        if self
            .selected
            .as_deref()
            .is_some_and(|id| !self.store.contains(id))
        {
            self.selected = None;
        }
        if let Some(active) = self.route.take() {
            let steps = self.search(&active.start, &active.end);
            debug!(start = %active.start, end = %active.end, kept = steps.is_some(), "re-resolved route");
            self.route = steps.map(|steps| ActiveRoute { steps, ..active });
        }
    }
}

impl Default for MetroSession {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

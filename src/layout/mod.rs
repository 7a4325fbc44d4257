pub mod bundling;
pub mod grid;
pub mod routing;
pub(crate) mod types;
pub use bundling::{BundledConnection, PairKey, bundle, bundle_all, bundle_offset, type_offset};
pub use grid::{Spiral, hub_position, layout, layout_incremental};
pub use routing::{octilinear_path, octilinear_points, points_to_path};
pub use types::*;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::{LayoutConfig, LayoutMode};
use crate::ir::{Connection, GridPoint, Station};
use crate::store::GraphStore;
use crate::viewport::ViewBox;

/// Grid positions for the whole store under the configured mode. `placed`
/// lists stations whose cells are already settled (used by incremental mode).
pub fn arrange(
    store: &GraphStore,
    placed: &BTreeSet<String>,
    config: &LayoutConfig,
) -> BTreeMap<String, GridPoint> {
    let positions = match config.mode {
        LayoutMode::Recompute => layout(store.stations(), config),
        LayoutMode::Incremental => layout_incremental(store.stations(), placed, config),
    };
    debug!(stations = positions.len(), mode = ?config.mode, "grid layout");
    positions
}

pub fn grid_to_world(point: GridPoint, config: &LayoutConfig) -> (f32, f32) {
    (
        point.x as f32 * config.grid_spacing,
        point.y as f32 * config.grid_spacing,
    )
}

/// Pixel-space scene for the current store: stations at their grid cells,
/// one octilinear polyline per drawable connection, plus emphasis state.
/// Connections with a missing endpoint or equal endpoints are skipped.
pub fn compute_layout(store: &GraphStore, config: &LayoutConfig, highlight: &Highlight) -> MetroLayout {
    let neighbours = selected_neighbours(store, highlight);

    let stations: BTreeMap<String, StationLayout> = store
        .stations()
        .map(|station| {
            let (x, y) = grid_to_world(station.position(), config);
            let layout = StationLayout {
                id: station.id.clone(),
                name: station.name.clone(),
                category: station.category.clone(),
                grid: station.position(),
                x,
                y,
                emphasis: station_emphasis(station, highlight, &neighbours),
            };
            (station.id.clone(), layout)
        })
        .collect();

    let drawable = store
        .connections()
        .iter()
        .enumerate()
        .filter(|(_, conn)| !conn.is_self_loop() && store.contains(&conn.from) && store.contains(&conn.to));

    let mut lines = Vec::new();
    for (pair, members) in bundle(drawable, config) {
        let (Some(start), Some(end)) = (stations.get(&pair.first), stations.get(&pair.second)) else {
            continue;
        };
        for member in members {
            let conn = &store.connections()[member.index];
            let points = octilinear_points(
                start.x,
                start.y,
                end.x,
                end.y,
                member.offset,
                config.route_tolerance,
            );
            lines.push(LineLayout {
                index: member.index,
                from: conn.from.clone(),
                to: conn.to.clone(),
                kind: conn.kind,
                pair: pair.clone(),
                offset: member.offset,
                path: points_to_path(&points),
                points,
                emphasis: line_emphasis(member.index, conn, highlight),
            });
        }
    }
    lines.sort_by_key(|line| line.index);

    let bounds = ViewBox::bounding(stations.values().map(|s| (s.x, s.y)))
        .unwrap_or(ViewBox::new(0.0, 0.0, 0.0, 0.0))
        .padded(config.canvas_padding);

    MetroLayout {
        stations,
        lines,
        bounds,
    }
}

fn selected_neighbours(store: &GraphStore, highlight: &Highlight) -> BTreeSet<String> {
    let Some(selected) = highlight.selected.as_deref() else {
        return BTreeSet::new();
    };
    store
        .connections_of(selected)
        .filter_map(|conn| conn.other_end(selected))
        .map(str::to_string)
        .collect()
}

fn station_emphasis(station: &Station, highlight: &Highlight, neighbours: &BTreeSet<String>) -> Emphasis {
    if let Some(route) = &highlight.route {
        return if route.stations.contains(&station.id) {
            Emphasis::OnRoute
        } else {
            Emphasis::Dimmed
        };
    }
    match highlight.selected.as_deref() {
        Some(selected) if selected == station.id => Emphasis::Selected,
        Some(_) if neighbours.contains(&station.id) => Emphasis::Normal,
        Some(_) => Emphasis::Dimmed,
        None => Emphasis::Normal,
    }
}

fn line_emphasis(index: usize, conn: &Connection, highlight: &Highlight) -> Emphasis {
    if let Some(route) = &highlight.route {
        return if route.connections.contains(&index) {
            Emphasis::OnRoute
        } else {
            Emphasis::Dimmed
        };
    }
    match highlight.selected.as_deref() {
        Some(selected) if conn.touches(selected) => Emphasis::Selected,
        Some(_) => Emphasis::Dimmed,
        None => Emphasis::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ConnectionKind;

    fn store() -> GraphStore {
        let mut store = GraphStore::new();
        let mut a = Station::new("a", "A");
        a.x = 0;
        let mut b = Station::new("b", "B");
        b.x = 2;
        let mut c = Station::new("c", "C");
        c.x = 2;
        c.y = 1;
        store.add_station(a, Vec::new()).unwrap();
        store
            .add_station(
                b,
                vec![
                    Connection::new("b", "a", ConnectionKind::Membership),
                    Connection::new("a", "b", ConnectionKind::Studio),
                ],
            )
            .unwrap();
        store
            .add_station(
                c,
                vec![
                    Connection::new("c", "b", ConnectionKind::Writing),
                    Connection::new("c", "ghost", ConnectionKind::Cover),
                    Connection::new("c", "c", ConnectionKind::Influence),
                ],
            )
            .unwrap();
        store
    }

    #[test]
    fn skips_dangling_and_self_loops() {
        let layout = compute_layout(&store(), &LayoutConfig::default(), &Highlight::default());
        assert_eq!(layout.lines.iter().map(|l| l.index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(layout.lines.iter().all(|l| l.emphasis == Emphasis::Normal));
    }

    #[test]
    fn parallel_lines_share_orientation_and_separate() {
        let config = LayoutConfig::default();
        let layout = compute_layout(&store(), &config, &Highlight::default());
        let membership = &layout.lines[0];
        let studio = &layout.lines[1];
        assert_eq!(membership.pair, studio.pair);
        // both drawn a -> b even though membership is stored b -> a
        assert_eq!(membership.points[0].0, 0.0);
        assert_eq!(studio.points[0].0, 0.0);
        assert_ne!(membership.points[0].1, studio.points[0].1);
        assert!(routing::is_octilinear(&membership.points));
    }

    #[test]
    fn selection_dims_unrelated_lines() {
        let highlight = Highlight {
            selected: Some("c".to_string()),
            route: None,
        };
        let layout = compute_layout(&store(), &LayoutConfig::default(), &highlight);
        assert_eq!(layout.lines[2].emphasis, Emphasis::Selected);
        assert_eq!(layout.lines[0].emphasis, Emphasis::Dimmed);
        assert_eq!(layout.stations["c"].emphasis, Emphasis::Selected);
        assert_eq!(layout.stations["b"].emphasis, Emphasis::Normal);
        assert_eq!(layout.stations["a"].emphasis, Emphasis::Dimmed);
    }

    #[test]
    fn route_overrides_selection() {
        let highlight = Highlight {
            selected: Some("c".to_string()),
            route: Some(RouteHighlight {
                connections: [0].into_iter().collect(),
                stations: ["a".to_string(), "b".to_string()].into_iter().collect(),
            }),
        };
        let layout = compute_layout(&store(), &LayoutConfig::default(), &highlight);
        assert_eq!(layout.lines[0].emphasis, Emphasis::OnRoute);
        assert_eq!(layout.lines[2].emphasis, Emphasis::Dimmed);
        assert_eq!(layout.stations["c"].emphasis, Emphasis::Dimmed);
    }

    #[test]
    fn bounds_cover_every_station() {
        let config = LayoutConfig::default();
        let layout = compute_layout(&store(), &config, &Highlight::default());
        for station in layout.stations.values() {
            assert!(layout.bounds.contains(station.x, station.y));
        }
        assert_eq!(layout.width(), 2.0 * config.grid_spacing + 2.0 * config.canvas_padding);
    }
}

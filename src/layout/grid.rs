use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::{HubConfig, LayoutConfig};
use crate::ir::{Connection, GridPoint, Station};

// Spiral legs run east, south, west, north.
const SPIRAL_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Initial cell for a new station: the weight-normalised mean of the hubs its
/// connections pull toward, rounded to the grid. No weighted connection means
/// the origin.
pub fn hub_position<'a>(
    connections: impl IntoIterator<Item = &'a Connection>,
    hubs: &HubConfig,
) -> GridPoint {
    let mut total = 0.0f32;
    let mut sum_x = 0.0f32;
    let mut sum_y = 0.0f32;
    for conn in connections {
        let Some(hub) = hubs.for_kind(conn.kind) else {
            continue;
        };
        if hub.weight <= 0.0 {
            continue;
        }
        total += hub.weight;
        sum_x += hub.at.x as f32 * hub.weight;
        sum_y += hub.at.y as f32 * hub.weight;
    }
    if total <= 0.0 {
        return GridPoint::ORIGIN;
    }
    GridPoint::new((sum_x / total).round() as i32, (sum_y / total).round() as i32)
}

/// Rectangular spiral over the grid, starting at `center` and widening by one
/// step every two turns.
#[derive(Debug, Clone)]
pub struct Spiral {
    cursor: GridPoint,
    step_x: i32,
    step_y: i32,
    direction: usize,
    leg_len: usize,
    leg_done: usize,
    turns: usize,
    started: bool,
}

impl Spiral {
    pub fn new(center: GridPoint, step_x: i32, step_y: i32) -> Self {
        Self {
            cursor: center,
            step_x: step_x.max(1),
            step_y: step_y.max(1),
            direction: 0,
            leg_len: 1,
            leg_done: 0,
            turns: 0,
            started: false,
        }
    }

    pub fn from_config(center: GridPoint, config: &LayoutConfig) -> Self {
        Self::new(center, config.spiral_step_x, config.spiral_step_y)
    }
}

impl Iterator for Spiral {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if !self.started {
            self.started = true;
            return Some(self.cursor);
        }
        let (ux, uy) = SPIRAL_DIRECTIONS[self.direction];
        self.cursor.x += ux * self.step_x;
        self.cursor.y += uy * self.step_y;
        self.leg_done += 1;
        if self.leg_done == self.leg_len {
            self.leg_done = 0;
            self.direction = (self.direction + 1) % SPIRAL_DIRECTIONS.len();
            self.turns += 1;
            if self.turns % 2 == 0 {
                self.leg_len += 1;
            }
        }
        Some(self.cursor)
    }
}

/// Stations in placement order: origin year ascending, missing years as 1970,
/// ties by id.
fn placement_order<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Vec<&'a Station> {
    let mut ordered: Vec<&Station> = stations.into_iter().collect();
    ordered.sort_by(|a, b| a.sort_year().cmp(&b.sort_year()).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// Full spiral layout of every station. Pure in its input; previous
/// coordinates are ignored.
pub fn layout<'a>(
    stations: impl IntoIterator<Item = &'a Station>,
    config: &LayoutConfig,
) -> BTreeMap<String, GridPoint> {
    let mut positions = BTreeMap::new();
    let mut occupied: HashSet<GridPoint> = HashSet::new();
    let mut spiral = Spiral::from_config(GridPoint::ORIGIN, config);

    for station in placement_order(stations) {
        let Some(cell) = spiral.by_ref().find(|cell| !occupied.contains(cell)) else {
            break;
        };
        occupied.insert(cell);
        positions.insert(station.id.clone(), cell);
    }
    positions
}

/// Keeps the cells of stations in `placed` and spirals everything else out
/// from its current (hub) cell. Pinned stations that collide are moved in
/// placement order, so the result still never overlaps.
pub fn layout_incremental<'a>(
    stations: impl IntoIterator<Item = &'a Station>,
    placed: &BTreeSet<String>,
    config: &LayoutConfig,
) -> BTreeMap<String, GridPoint> {
    let ordered = placement_order(stations);
    let mut positions = BTreeMap::new();
    let mut occupied: HashSet<GridPoint> = HashSet::new();
    let mut pending = Vec::new();

    for station in &ordered {
        let cell = station.position();
        if placed.contains(&station.id) && occupied.insert(cell) {
            positions.insert(station.id.clone(), cell);
        } else {
            pending.push(*station);
        }
    }

    for station in pending {
        let Some(cell) = Spiral::from_config(station.position(), config)
            .find(|cell| !occupied.contains(cell))
        else {
            continue;
        };
        occupied.insert(cell);
        positions.insert(station.id.clone(), cell);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ConnectionKind;

    fn station(id: &str, year: Option<i32>) -> Station {
        let mut station = Station::new(id, id.to_uppercase());
        station.origin_year = year;
        station
    }

    #[test]
    fn spiral_walks_wide_rings() {
        let cells: Vec<GridPoint> = Spiral::new(GridPoint::ORIGIN, 2, 1).take(10).collect();
        let expected = [
            (0, 0),
            (2, 0),
            (2, 1),
            (0, 1),
            (-2, 1),
            (-2, 0),
            (-2, -1),
            (0, -1),
            (2, -1),
            (4, -1),
        ];
        let expected: Vec<GridPoint> = expected.iter().map(|&(x, y)| GridPoint::new(x, y)).collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn spiral_never_repeats_a_cell() {
        let cells: Vec<GridPoint> = Spiral::new(GridPoint::new(3, -2), 2, 1).take(500).collect();
        let unique: HashSet<GridPoint> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len());
        assert_eq!(cells[0], GridPoint::new(3, -2));
    }

    #[test]
    fn hub_without_weighted_connections_is_origin() {
        let hubs = HubConfig::default();
        assert_eq!(hub_position(std::iter::empty(), &hubs), GridPoint::ORIGIN);
        let covers = [Connection::new("a", "b", ConnectionKind::Cover)];
        assert_eq!(hub_position(&covers, &hubs), GridPoint::ORIGIN);
    }

    #[test]
    fn hub_averages_by_weight() {
        let hubs = HubConfig::default();
        let only_membership = [Connection::new("b", "a", ConnectionKind::Membership)];
        assert_eq!(hub_position(&only_membership, &hubs), hubs.membership.at);

        // membership (-6,-4) w3 and studio (6,-4) w2 -> x = -6/5 -> -1
        let mixed = [
            Connection::new("b", "a", ConnectionKind::Membership),
            Connection::new("b", "c", ConnectionKind::Studio),
            Connection::new("b", "d", ConnectionKind::Influence),
        ];
        assert_eq!(hub_position(&mixed, &hubs), GridPoint::new(-1, -4));
    }

    #[test]
    fn layout_orders_by_year_then_id() {
        let stations = vec![
            station("late", Some(1990)),
            station("unknown", None),
            station("early", Some(1955)),
            station("alpha", Some(1990)),
        ];
        let positions = layout(&stations, &LayoutConfig::default());
        assert_eq!(positions["early"], GridPoint::new(0, 0));
        assert_eq!(positions["unknown"], GridPoint::new(2, 0));
        assert_eq!(positions["alpha"], GridPoint::new(2, 1));
        assert_eq!(positions["late"], GridPoint::new(0, 1));
    }

    #[test]
    fn layout_is_deterministic_and_collision_free() {
        let stations: Vec<Station> = (0..40)
            .map(|i| station(&format!("s{i:02}"), if i % 3 == 0 { None } else { Some(1950 + i % 7) }))
            .collect();
        let config = LayoutConfig::default();
        let first = layout(&stations, &config);
        let reversed: Vec<Station> = stations.iter().rev().cloned().collect();
        let second = layout(&reversed, &config);
        assert_eq!(first, second);
        let cells: HashSet<GridPoint> = first.values().copied().collect();
        assert_eq!(cells.len(), stations.len());
    }

    #[test]
    fn incremental_keeps_placed_cells() {
        let config = LayoutConfig::default();
        let mut a = station("a", Some(1960));
        a.x = 4;
        a.y = 4;
        let mut b = station("b", Some(1950));
        b.x = 4;
        b.y = 4;
        let mut c = station("c", Some(1970));
        c.x = -6;
        c.y = -4;
        let placed: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let positions = layout_incremental([&a, &b, &c], &placed, &config);
        assert_eq!(positions["a"], GridPoint::new(4, 4));
        assert_eq!(positions["b"], GridPoint::new(6, 4));
        assert_eq!(positions["c"], GridPoint::new(-6, -4));
    }
}

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::config::RouteSearch;
use crate::ir::Connection;
use crate::layout::RouteHighlight;
use crate::store::GraphStore;

pub const DEFAULT_MAX_DEPTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Position of the connection in the store's relationship list.
    pub index: usize,
    pub connection: Connection,
    /// Station reached by taking this connection.
    pub next: String,
}

/// Runs the configured search strategy.
pub fn search(
    store: &GraphStore,
    start: &str,
    end: &str,
    max_depth: usize,
    strategy: RouteSearch,
) -> Option<Vec<RouteStep>> {
    match strategy {
        RouteSearch::Exhaustive => find_route(store, start, end, max_depth),
        RouteSearch::BreadthFirst => find_route_bfs(store, start, end, max_depth),
    }
}

/// Fewest-edge simple path from `start` to `end` using at most `max_depth`
/// connections, treating every connection as undirected. Connections to
/// stations missing from the store are never followed. Enumerates paths
/// depth-first in relationship order; among equally short paths the first one
/// completed wins.
pub fn find_route(store: &GraphStore, start: &str, end: &str, max_depth: usize) -> Option<Vec<RouteStep>> {
    if !endpoints_valid(store, start, end) {
        return None;
    }

    let mut walk = DepthFirst {
        store,
        connections: store.connections(),
        end,
        max_depth,
        visited: HashSet::from([start]),
        path: Vec::new(),
        best: None,
    };
    walk.visit(start);

    let route = walk.best.map(|path| steps(store.connections(), &path));
    log_result(start, end, route.as_deref());
    route
}

struct DepthFirst<'a> {
    store: &'a GraphStore,
    connections: &'a [Connection],
    end: &'a str,
    max_depth: usize,
    visited: HashSet<&'a str>,
    path: Vec<(usize, &'a str)>,
    best: Option<Vec<(usize, &'a str)>>,
}

impl<'a> DepthFirst<'a> {
    fn visit(&mut self, current: &'a str) {
        if self.path.len() >= self.max_depth {
            return;
        }
        // Any extension would be no shorter than what we already hold.
        if let Some(best) = &self.best {
            if self.path.len() + 1 >= best.len() {
                return;
            }
        }

        let connections = self.connections;
        for (index, conn) in connections.iter().enumerate() {
            let Some(next) = conn.other_end(current) else {
                continue;
            };
            if self.visited.contains(next) || !self.store.contains(next) {
                continue;
            }
            self.path.push((index, next));
            if next == self.end {
                let shorter = self
                    .best
                    .as_ref()
                    .is_none_or(|best| self.path.len() < best.len());
                if shorter {
                    self.best = Some(self.path.clone());
                }
            } else {
                self.visited.insert(next);
                self.visit(next);
                self.visited.remove(next);
            }
            self.path.pop();
        }
    }
}

/// Same contract as [`find_route`] via bounded breadth-first search; the hop
/// count always matches, the chosen path may differ among equal-length ties.
pub fn find_route_bfs(store: &GraphStore, start: &str, end: &str, max_depth: usize) -> Option<Vec<RouteStep>> {
    if !endpoints_valid(store, start, end) {
        return None;
    }

    let mut adjacency: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
    for (index, conn) in store.connections().iter().enumerate() {
        if conn.is_self_loop() || !store.contains(&conn.from) || !store.contains(&conn.to) {
            continue;
        }
        adjacency.entry(conn.from.as_str()).or_default().push((index, conn.to.as_str()));
        adjacency.entry(conn.to.as_str()).or_default().push((index, conn.from.as_str()));
    }
    // Edges are pushed per connection, so each list is already in relationship order.

    let mut came_from: HashMap<&str, (usize, &str)> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for &(index, next) in adjacency.get(current).map(Vec::as_slice).unwrap_or_default() {
            if !seen.insert(next) {
                continue;
            }
            came_from.insert(next, (index, current));
            if next == end {
                let route = reconstruct(store.connections(), &came_from, start, end);
                log_result(start, end, Some(&route));
                return Some(route);
            }
            queue.push_back((next, depth + 1));
        }
    }

    log_result(start, end, None);
    None
}

fn reconstruct(
    connections: &[Connection],
    came_from: &HashMap<&str, (usize, &str)>,
    start: &str,
    end: &str,
) -> Vec<RouteStep> {
    let mut reversed = Vec::new();
    let mut cursor = end;
    while cursor != start {
        let Some(&(index, previous)) = came_from.get(cursor) else {
            break;
        };
        reversed.push((index, cursor));
        cursor = previous;
    }
    reversed.reverse();
    steps(connections, &reversed)
}

fn steps(connections: &[Connection], path: &[(usize, &str)]) -> Vec<RouteStep> {
    path.iter()
        .map(|&(index, next)| RouteStep {
            index,
            connection: connections[index].clone(),
            next: next.to_string(),
        })
        .collect()
}

fn endpoints_valid(store: &GraphStore, start: &str, end: &str) -> bool {
    start != end && store.contains(start) && store.contains(end)
}

fn log_result(start: &str, end: &str, route: Option<&[RouteStep]>) {
    match route {
        Some(route) => debug!(start, end, hops = route.len(), "route found"),
        None => debug!(start, end, "no route"),
    }
}

/// Connections and stations a route passes through, for emphasis.
pub fn route_highlight(start: &str, route: &[RouteStep]) -> RouteHighlight {
    let mut highlight = RouteHighlight::default();
    highlight.stations.insert(start.to_string());
    for step in route {
        highlight.connections.insert(step.index);
        highlight.stations.insert(step.next.clone());
    }
    highlight
}

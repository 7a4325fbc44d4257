use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ir::{ConnectionKind, GridPoint};
use crate::viewport::ViewBox;

use super::bundling::PairKey;

/// Display state a renderer maps to colour, width and opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Emphasis {
    Normal,
    Selected,
    OnRoute,
    Dimmed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub selected: Option<String>,
    pub route: Option<RouteHighlight>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteHighlight {
    pub connections: BTreeSet<usize>,
    pub stations: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLayout {
    pub id: String,
    pub name: String,
    pub category: String,
    pub grid: GridPoint,
    pub x: f32,
    pub y: f32,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLayout {
    /// Position of the connection in the store's relationship list.
    pub index: usize,
    pub from: String,
    pub to: String,
    pub kind: ConnectionKind,
    #[serde(serialize_with = "serialize_pair")]
    pub pair: PairKey,
    pub offset: f32,
    pub points: Vec<(f32, f32)>,
    pub path: String,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetroLayout {
    pub stations: BTreeMap<String, StationLayout>,
    pub lines: Vec<LineLayout>,
    /// Padded extent of the map in world pixels.
    pub bounds: ViewBox,
}

impl MetroLayout {
    pub fn station_positions(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.stations.values().map(|station| (station.x, station.y))
    }

    pub fn width(&self) -> f32 {
        self.bounds.width
    }

    pub fn height(&self) -> f32 {
        self.bounds.height
    }
}

fn serialize_pair<S: serde::Serializer>(pair: &PairKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(pair)
}

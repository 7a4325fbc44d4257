use crate::layout::MetroLayout;
use crate::session::{ActiveRoute, MetroSession};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub stations: Vec<StationDump>,
    pub lines: Vec<LineDump>,
    pub route: Option<RouteDump>,
    pub selected: Option<String>,
    pub pending: Vec<PendingDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDump {
    pub id: String,
    pub name: String,
    pub grid: [i32; 2],
    pub x: f32,
    pub y: f32,
    pub emphasis: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDump {
    pub index: usize,
    pub from: String,
    pub to: String,
    pub kind: String,
    pub pair: String,
    pub offset: f32,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDump {
    pub start: String,
    pub end: String,
    pub stations: Vec<String>,
    pub connections: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDump {
    pub source: String,
    pub target: String,
    pub kind: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &MetroLayout, session: &MetroSession) -> Self {
        let stations = layout
            .stations
            .values()
            .map(|station| StationDump {
                id: station.id.clone(),
                name: station.name.clone(),
                grid: [station.grid.x, station.grid.y],
                x: station.x,
                y: station.y,
                emphasis: format!("{:?}", station.emphasis),
            })
            .collect();

        let lines = layout
            .lines
            .iter()
            .map(|line| LineDump {
                index: line.index,
                from: line.from.clone(),
                to: line.to.clone(),
                kind: line.kind.to_string(),
                pair: line.pair.to_string(),
                offset: line.offset,
                points: line.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        let pending = session
            .pending()
            .map(|pending| PendingDump {
                source: pending.source_id.clone(),
                target: pending.target_id().to_string(),
                kind: pending.connection.kind.to_string(),
            })
            .collect();

        LayoutDump {
            width: layout.width(),
            height: layout.height(),
            stations,
            lines,
            route: session.active_route().map(route_dump),
            selected: session.selected().map(str::to_string),
            pending,
        }
    }
}

fn route_dump(route: &ActiveRoute) -> RouteDump {
    let mut stations = vec![route.start.clone()];
    stations.extend(route.steps.iter().map(|step| step.next.clone()));
    RouteDump {
        start: route.start.clone(),
        end: route.end.clone(),
        stations,
        connections: route.steps.iter().map(|step| step.index).collect(),
    }
}

pub fn write_layout_dump(path: &Path, layout: &MetroLayout, session: &MetroSession) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, session);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

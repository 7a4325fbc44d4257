#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod route;
pub mod session;
pub mod store;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, LayoutMode, RenderConfig, RouteSearch};
pub use error::{MetroError, MetroResult};
pub use ingest::{ConnectionRecord, StationRecord};
pub use ir::{Connection, ConnectionKind, GridPoint, Snapshot, Station};
pub use layout::{Highlight, MetroLayout, compute_layout};
pub use render::render_svg;
pub use session::{AddOutcome, MetroSession};
pub use store::GraphStore;
pub use theme::Theme;

/// Renders a persisted snapshot with no selection or route.
pub fn render_snapshot_svg(snapshot_json: &str, config: &Config) -> MetroResult<String> {
    let store = GraphStore::from_snapshot(GraphStore::parse_snapshot(snapshot_json)?);
    let layout = compute_layout(&store, &config.layout, &Highlight::default());
    Ok(render_svg(&layout, &config.theme, &config.render))
}

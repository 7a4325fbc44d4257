use crate::ir::{ConnectionKind, GridPoint};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Re-run the spiral over every station on each insertion.
    Recompute,
    /// Keep placed stations and spiral new ones out from their hub cell.
    Incremental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteSearch {
    Exhaustive,
    BreadthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub at: GridPoint,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub membership: Hub,
    pub studio: Hub,
    pub writing: Hub,
    pub label: Hub,
}

impl HubConfig {
    /// Hub for a connection kind; kinds outside the four categories pull nowhere.
    pub fn for_kind(&self, kind: ConnectionKind) -> Option<&Hub> {
        match kind {
            ConnectionKind::Membership => Some(&self.membership),
            ConnectionKind::Studio => Some(&self.studio),
            ConnectionKind::Writing => Some(&self.writing),
            ConnectionKind::Label => Some(&self.label),
            _ => None,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            membership: Hub {
                at: GridPoint::new(-6, -4),
                weight: 3.0,
            },
            studio: Hub {
                at: GridPoint::new(6, -4),
                weight: 2.0,
            },
            writing: Hub {
                at: GridPoint::new(-6, 4),
                weight: 2.0,
            },
            label: Hub {
                at: GridPoint::new(6, 4),
                weight: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Pixels per grid cell.
    pub grid_spacing: f32,
    /// Pixels around the map when computing the canvas size.
    pub canvas_padding: f32,
    pub hubs: HubConfig,
    /// Grid cells moved per horizontal spiral step.
    pub spiral_step_x: i32,
    /// Grid cells moved per vertical spiral step.
    pub spiral_step_y: i32,
    pub mode: LayoutMode,
    /// Band within which a segment counts as horizontal, vertical or diagonal.
    pub route_tolerance: f32,
    pub bundle_gap: f32,
    pub type_offset_unit: f32,
    pub max_route_depth: usize,
    pub route_search: RouteSearch,
    pub history_capacity: usize,
    pub fit_padding: f32,
    pub min_view_width: f32,
    pub max_view_width: f32,
    pub minimap_width: f32,
    pub minimap_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 60.0,
            canvas_padding: 80.0,
            hubs: HubConfig::default(),
            spiral_step_x: 2,
            spiral_step_y: 1,
            mode: LayoutMode::Recompute,
            route_tolerance: 5.0,
            bundle_gap: 6.0,
            type_offset_unit: 3.0,
            max_route_depth: 6,
            route_search: RouteSearch::Exhaustive,
            history_capacity: 50,
            fit_padding: 100.0,
            min_view_width: 120.0,
            max_view_width: 20_000.0,
            minimap_width: 200.0,
            minimap_height: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub show_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::metro();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    station_fill: Option<String>,
    station_stroke: Option<String>,
    station_radius: Option<f32>,
    label_color: Option<String>,
    line_width: Option<f32>,
    highlight_width: Option<f32>,
    dim_opacity: Option<f32>,
    line_colors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HubFile {
    x: Option<i32>,
    y: Option<i32>,
    weight: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    grid_spacing: Option<f32>,
    canvas_padding: Option<f32>,
    hubs: Option<BTreeMap<String, HubFile>>,
    spiral_step_x: Option<i32>,
    spiral_step_y: Option<i32>,
    mode: Option<LayoutMode>,
    route_tolerance: Option<f32>,
    bundle_gap: Option<f32>,
    type_offset_unit: Option<f32>,
    max_route_depth: Option<usize>,
    route_search: Option<RouteSearch>,
    history_capacity: Option<usize>,
    fit_padding: Option<f32>,
    min_view_width: Option<f32>,
    max_view_width: Option<f32>,
    minimap_width: Option<f32>,
    minimap_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutFile>,
    show_labels: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document (JSON5) on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "night" || theme_name == "dark" {
            config.theme = Theme::night();
        } else if theme_name == "metro" || theme_name == "default" {
            config.theme = Theme::metro();
        } else {
            anyhow::bail!("unknown theme '{theme_name}'");
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config, vars)?;
    }
    if let Some(layout) = parsed.layout {
        apply_layout_file(&mut config.layout, layout)?;
    }
    if let Some(show) = parsed.show_labels {
        config.render.show_labels = show;
    }
    Ok(config)
}

fn apply_theme_variables(config: &mut Config, vars: ThemeVariables) -> anyhow::Result<()> {
    let theme = &mut config.theme;
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
    if let Some(v) = vars.background {
        config.render.background = v.clone();
        theme.background = v;
    }
    if let Some(v) = vars.station_fill {
        theme.station_fill = v;
    }
    if let Some(v) = vars.station_stroke {
        theme.station_stroke = v;
    }
    if let Some(v) = vars.station_radius {
        theme.station_radius = v;
    }
    if let Some(v) = vars.label_color {
        theme.label_color = v;
    }
    if let Some(v) = vars.line_width {
        theme.line_width = v;
    }
    if let Some(v) = vars.highlight_width {
        theme.highlight_width = v;
    }
    if let Some(v) = vars.dim_opacity {
        theme.dim_opacity = v.clamp(0.0, 1.0);
    }
    if let Some(colors) = vars.line_colors {
        for (token, color) in colors {
            let kind = ConnectionKind::from_token(&token)
                .ok_or_else(|| anyhow::anyhow!("unknown line kind '{token}' in lineColors"))?;
            theme.lines.set_kind(kind, color);
        }
    }
    Ok(())
}

fn apply_layout_file(layout: &mut LayoutConfig, file: LayoutFile) -> anyhow::Result<()> {
    if let Some(v) = file.grid_spacing {
        layout.grid_spacing = v;
    }
    if let Some(v) = file.canvas_padding {
        layout.canvas_padding = v;
    }
    if let Some(hubs) = file.hubs {
        for (token, hub_file) in hubs {
            let hub = match ConnectionKind::from_token(&token) {
                Some(ConnectionKind::Membership) => &mut layout.hubs.membership,
                Some(ConnectionKind::Studio) => &mut layout.hubs.studio,
                Some(ConnectionKind::Writing) => &mut layout.hubs.writing,
                Some(ConnectionKind::Label) => &mut layout.hubs.label,
                _ => anyhow::bail!("'{token}' has no hub"),
            };
            if let Some(x) = hub_file.x {
                hub.at.x = x;
            }
            if let Some(y) = hub_file.y {
                hub.at.y = y;
            }
            if let Some(weight) = hub_file.weight {
                hub.weight = weight.max(0.0);
            }
        }
    }
    if let Some(v) = file.spiral_step_x {
        anyhow::ensure!(v > 0, "spiralStepX must be positive");
        layout.spiral_step_x = v;
    }
    if let Some(v) = file.spiral_step_y {
        anyhow::ensure!(v > 0, "spiralStepY must be positive");
        layout.spiral_step_y = v;
    }
    if let Some(v) = file.mode {
        layout.mode = v;
    }
    if let Some(v) = file.route_tolerance {
        layout.route_tolerance = v.max(0.0);
    }
    if let Some(v) = file.bundle_gap {
        layout.bundle_gap = v;
    }
    if let Some(v) = file.type_offset_unit {
        layout.type_offset_unit = v;
    }
    if let Some(v) = file.max_route_depth {
        layout.max_route_depth = v;
    }
    if let Some(v) = file.route_search {
        layout.route_search = v;
    }
    if let Some(v) = file.history_capacity {
        anyhow::ensure!(v > 0, "historyCapacity must be at least 1");
        layout.history_capacity = v;
    }
    if let Some(v) = file.fit_padding {
        anyhow::ensure!(v >= 0.0, "fitPadding must not be negative");
        layout.fit_padding = v;
    }
    if let Some(v) = file.min_view_width {
        layout.min_view_width = v;
    }
    if let Some(v) = file.max_view_width {
        layout.max_view_width = v;
    }
    anyhow::ensure!(
        layout.min_view_width > 0.0 && layout.min_view_width <= layout.max_view_width,
        "view width limits are inverted"
    );
    if let Some(v) = file.minimap_width {
        layout.minimap_width = v;
    }
    if let Some(v) = file.minimap_height {
        layout.minimap_height = v;
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

use crate::ir::ConnectionKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineColors {
    pub membership: String,
    pub studio: String,
    pub writing: String,
    pub label: String,
    pub feature: String,
    pub cover: String,
    pub influence: String,
}

impl LineColors {
    pub fn for_kind(&self, kind: ConnectionKind) -> &str {
        match kind {
            ConnectionKind::Membership => &self.membership,
            ConnectionKind::Studio => &self.studio,
            ConnectionKind::Writing => &self.writing,
            ConnectionKind::Label => &self.label,
            ConnectionKind::Feature => &self.feature,
            ConnectionKind::Cover => &self.cover,
            ConnectionKind::Influence => &self.influence,
        }
    }

    pub fn set_kind(&mut self, kind: ConnectionKind, color: String) {
        let slot = match kind {
            ConnectionKind::Membership => &mut self.membership,
            ConnectionKind::Studio => &mut self.studio,
            ConnectionKind::Writing => &mut self.writing,
            ConnectionKind::Label => &mut self.label,
            ConnectionKind::Feature => &mut self.feature,
            ConnectionKind::Cover => &mut self.cover,
            ConnectionKind::Influence => &mut self.influence,
        };
        *slot = color;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub station_fill: String,
    pub station_stroke: String,
    pub station_radius: f32,
    pub label_color: String,
    pub line_width: f32,
    pub highlight_width: f32,
    pub dim_opacity: f32,
    pub lines: LineColors,
}

impl Theme {
    pub fn metro() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            station_fill: "#FFFFFF".to_string(),
            station_stroke: "#1C2430".to_string(),
            station_radius: 7.0,
            label_color: "#1C2430".to_string(),
            line_width: 4.0,
            highlight_width: 7.0,
            dim_opacity: 0.2,
            lines: LineColors {
                membership: "#E32017".to_string(),
                studio: "#0098D4".to_string(),
                writing: "#00782A".to_string(),
                label: "#FFD300".to_string(),
                feature: "#9B0056".to_string(),
                cover: "#F3A9BB".to_string(),
                influence: "#A0A5A9".to_string(),
            },
        }
    }

    pub fn night() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#10141C".to_string(),
            station_fill: "#10141C".to_string(),
            station_stroke: "#E6EAF2".to_string(),
            station_radius: 7.0,
            label_color: "#E6EAF2".to_string(),
            line_width: 4.0,
            highlight_width: 7.0,
            dim_opacity: 0.15,
            lines: LineColors {
                membership: "#FF5A4F".to_string(),
                studio: "#3CC4FF".to_string(),
                writing: "#3DDC84".to_string(),
                label: "#FFE45C".to_string(),
                feature: "#E05FA8".to_string(),
                cover: "#FFC2D1".to_string(),
                influence: "#B8BEC4".to_string(),
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::metro()
    }
}

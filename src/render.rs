use crate::config::RenderConfig;
use crate::layout::{Emphasis, LineLayout, MetroLayout, StationLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &MetroLayout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = config.width.max(200.0);
    let height = config.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{}\" preserveAspectRatio=\"xMidYMid meet\">",
        layout.bounds.to_svg_viewbox()
    ));

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        layout.bounds.x, layout.bounds.y, layout.bounds.width, layout.bounds.height, config.background
    ));

    // Highlighted lines go last so they sit on top of their bundle.
    svg.push_str("<g class=\"lines\">");
    let (highlighted, rest): (Vec<&LineLayout>, Vec<&LineLayout>) = layout
        .lines
        .iter()
        .partition(|line| matches!(line.emphasis, Emphasis::Selected | Emphasis::OnRoute));
    for line in rest.into_iter().chain(highlighted) {
        svg.push_str(&line_svg(line, theme));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"stations\">");
    for station in layout.stations.values() {
        svg.push_str(&station_svg(station, theme, config.show_labels));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn line_svg(line: &LineLayout, theme: &Theme) -> String {
    let stroke_width = match line.emphasis {
        Emphasis::Selected | Emphasis::OnRoute => theme.highlight_width,
        Emphasis::Normal | Emphasis::Dimmed => theme.line_width,
    };
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{} data-kind=\"{}\" data-pair=\"{}\"/>",
        line.path,
        theme.lines.for_kind(line.kind),
        stroke_width,
        opacity_attr(line.emphasis, theme),
        line.kind,
        escape_xml(&line.pair.to_string())
    )
}

fn station_svg(station: &StationLayout, theme: &Theme, show_labels: bool) -> String {
    let mut out = String::new();
    let stroke_width = match station.emphasis {
        Emphasis::Selected | Emphasis::OnRoute => 3.5,
        Emphasis::Normal | Emphasis::Dimmed => 2.0,
    };
    out.push_str(&format!(
        "<g{} data-id=\"{}\">",
        opacity_attr(station.emphasis, theme),
        escape_xml(&station.id)
    ));
    out.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width:.2}\"/>",
        station.x, station.y, theme.station_radius, theme.station_fill, theme.station_stroke
    ));
    if show_labels {
        let label_y = station.y + theme.station_radius + theme.font_size + 2.0;
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{label_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            station.x,
            theme.font_family,
            theme.font_size,
            theme.label_color,
            escape_xml(&station.name)
        ));
    }
    out.push_str("</g>");
    out
}

fn opacity_attr(emphasis: Emphasis, theme: &Theme) -> String {
    match emphasis {
        Emphasis::Dimmed => format!(" opacity=\"{:.2}\"", theme.dim_opacity),
        _ => String::new(),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid render size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Connection, ConnectionKind, Station};
    use crate::layout::{Highlight, compute_layout};
    use crate::store::GraphStore;

    fn layout(highlight: &Highlight) -> MetroLayout {
        let mut store = GraphStore::new();
        store.add_station(Station::new("a", "Sly & Robbie"), Vec::new()).unwrap();
        let mut b = Station::new("b", "Black Ark");
        b.x = 2;
        store
            .add_station(b, vec![Connection::new("b", "a", ConnectionKind::Studio)])
            .unwrap();
        compute_layout(&store, &LayoutConfig::default(), highlight)
    }

    #[test]
    fn render_svg_basic() {
        let theme = Theme::metro();
        let svg = render_svg(&layout(&Highlight::default()), &theme, &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Sly &amp; Robbie"));
        assert!(svg.contains(&theme.lines.studio));
        assert!(svg.contains("data-pair=\"a|b\""));
        assert!(!svg.contains("opacity="));
    }

    #[test]
    fn dims_and_widens_by_emphasis() {
        let theme = Theme::metro();
        let highlight = Highlight {
            selected: Some("a".to_string()),
            route: None,
        };
        let svg = render_svg(&layout(&highlight), &theme, &RenderConfig::default());
        assert!(svg.contains(&format!("stroke-width=\"{:.2}\"", theme.highlight_width)));

        let mut config = RenderConfig::default();
        config.show_labels = false;
        let svg = render_svg(&layout(&Highlight::default()), &theme, &config);
        assert!(!svg.contains("<text"));
    }
}

use artist_metro::{Config, Theme, render_snapshot_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetroRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    show_labels: Option<bool>,
}

fn build_config(options: MetroRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("night") {
        config.theme = Theme::night();
        config.render.background = config.theme.background.clone();
    }

    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    if let Some(show_labels) = options.show_labels {
        config.render.show_labels = show_labels;
    }

    config
}

#[wasm_bindgen]
pub fn render_metro_svg(snapshot_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<MetroRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        MetroRenderOptions::default()
    };

    let config = build_config(options);
    render_snapshot_svg(snapshot_json, &config).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use artist_metro::render_snapshot_svg;

    use crate::{MetroRenderOptions, build_config};

    #[test]
    fn renders_snapshot_with_night_theme() {
        let snapshot = r#"{
            "entities": {
                "a": {"id": "a", "name": "King Tubby", "x": 0, "y": 0},
                "b": {"id": "b", "name": "Lee Perry", "x": 2, "y": 0}
            },
            "relationships": [{"from": "b", "to": "a", "type": "studio"}]
        }"#;
        let options = MetroRenderOptions {
            theme: Some("night".to_string()),
            ..Default::default()
        };
        let config = build_config(options);
        let svg = render_snapshot_svg(snapshot, &config).expect("snapshot should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("King Tubby"));
        assert!(svg.contains(&config.theme.lines.studio));
    }
}

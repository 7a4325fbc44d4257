use crate::config::{Config, load_config};
use crate::ingest::parse_records;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::session::MetroSession;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "metro", version, about = "Render an artist connection graph as a metro map")]
pub struct Args {
    /// Input file (snapshot or station records JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Highlight the shortest route between two stations
    #[arg(long = "route", num_args = 2, value_names = ["FROM", "TO"])]
    pub route: Option<Vec<String>>,

    /// Select a station before rendering
    #[arg(long = "select")]
    pub select: Option<String>,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Write the resulting graph snapshot as JSON
    #[arg(long = "save-snapshot")]
    pub save_snapshot: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// More log output (repeatable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Shape of the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Snapshot,
    Records,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let mut session = build_session(&input, &config)?;

    if let Some(id) = args.select.as_deref() {
        session.select(id)?;
    }
    if let Some([from, to]) = args.route.as_deref() {
        if session.find_route(from, to)?.is_none() {
            warn!(from = %from, to = %to, "no route within depth limit");
        }
    }
    session.fit_view(config.render.width / config.render.height);

    let scene = session.scene();
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &scene, &session)?;
    }
    if let Some(path) = args.save_snapshot.as_deref() {
        std::fs::write(path, session.snapshot_json()?)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
    }

    let svg = render_svg(&scene, &config.theme, &config.render);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

/// Loads a snapshot directly, or feeds station records through a session one
/// at a time so hubs, pending connections and layout apply as they arrive.
pub fn build_session(input: &str, config: &Config) -> Result<MetroSession> {
    let mut session = MetroSession::new(config.layout.clone())
        .with_screen(config.render.width, config.render.height);
    match detect_input(input)? {
        InputKind::Snapshot => {
            session
                .load_snapshot_json(input)
                .context("input is not a valid snapshot")?;
            info!(stations = session.store().len(), "snapshot loaded");
        }
        InputKind::Records => {
            for record in parse_records(input).context("input is not a list of station records")? {
                if let Err(err) = session.add_station(record) {
                    warn!(%err, "skipping record");
                }
            }
            info!(
                stations = session.store().len(),
                pending = session.pending().count(),
                "records ingested"
            );
        }
    }
    Ok(session)
}

fn detect_input(input: &str) -> Result<InputKind> {
    let value: serde_json::Value = serde_json::from_str(input).context("input is not JSON")?;
    let is_snapshot = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("entities") || obj.contains_key("relationships"));
    Ok(if is_snapshot {
        InputKind::Snapshot
    } else {
        InputKind::Records
    })
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_input_shape() {
        assert_eq!(
            detect_input(r#"{"entities": {}, "relationships": []}"#).unwrap(),
            InputKind::Snapshot
        );
        assert_eq!(
            detect_input(r#"[{"id": "a", "name": "A"}]"#).unwrap(),
            InputKind::Records
        );
        assert_eq!(
            detect_input(r#"{"id": "a", "name": "A"}"#).unwrap(),
            InputKind::Records
        );
        assert!(detect_input("not json").is_err());
    }

    #[test]
    fn records_feed_through_session() {
        let input = r#"[
            {"id": "b", "name": "B", "connections": [{"type": "membership", "targetId": "a"}]},
            {"id": "a", "name": "A", "originYear": 1960},
            {"id": "a", "name": "Duplicate"}
        ]"#;
        let session = build_session(input, &Config::default()).unwrap();
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.store().connections().len(), 1);
        assert_eq!(session.pending().count(), 0);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let err = build_session(r#"{"entities": {}}"#, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("snapshot"));
    }
}

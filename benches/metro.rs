use artist_metro::config::{LayoutConfig, LayoutMode, RenderConfig, RouteSearch};
use artist_metro::ingest::StationRecord;
use artist_metro::ir::ConnectionKind;
use artist_metro::layout::{Highlight, compute_layout};
use artist_metro::render::render_svg;
use artist_metro::route;
use artist_metro::session::MetroSession;
use artist_metro::theme::Theme;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A chain of stations plus `extra` cross connections, cycling through kinds.
fn network_records(stations: usize, extra: usize) -> Vec<StationRecord> {
    let mut records = Vec::with_capacity(stations);
    let mut count = 0usize;
    for i in 0..stations {
        let mut record = StationRecord::new(format!("s{i}"), format!("Station {i}"))
            .with_year(1950 + (i % 60) as i32);
        if i > 0 {
            let kind = ConnectionKind::ALL[i % ConnectionKind::ALL.len()];
            record = record.connect(kind, format!("s{}", i - 1));
        }
        let mut j = 0;
        while count < extra && j + 2 <= i {
            if (i + j) % 3 == 0 {
                let kind = ConnectionKind::ALL[(i + j) % ConnectionKind::ALL.len()];
                record = record.connect(kind, format!("s{j}"));
                count += 1;
            }
            j += 1;
        }
        records.push(record);
    }
    records
}

fn build_session(stations: usize, extra: usize, config: &LayoutConfig) -> MetroSession {
    let mut session = MetroSession::new(config.clone());
    for record in network_records(stations, extra) {
        session.add_station(record).expect("generated ids are unique");
    }
    session
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    for mode in [LayoutMode::Recompute, LayoutMode::Incremental] {
        let config = LayoutConfig {
            mode,
            ..LayoutConfig::default()
        };
        for (stations, extra) in [(20usize, 20usize), (60, 120), (120, 300)] {
            let name = format!("{mode:?}_{stations}_{extra}");
            let records = network_records(stations, extra);
            group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
                b.iter(|| {
                    let mut session = MetroSession::new(config.clone());
                    for record in records.iter().cloned() {
                        session.add_station(black_box(record)).expect("unique ids");
                    }
                    black_box(session.store().len());
                });
            });
        }
    }
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    let config = LayoutConfig::default();
    for (stations, extra) in [(20usize, 20usize), (60, 120), (120, 300)] {
        let name = format!("dense_{stations}_{extra}");
        let session = build_session(stations, extra, &config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &session, |b, session| {
            b.iter(|| {
                let layout = compute_layout(black_box(session.store()), &config, &Highlight::default());
                black_box(layout.lines.len());
            });
        });
    }
    group.finish();
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    let config = LayoutConfig::default();
    for (stations, extra) in [(40usize, 80usize), (80, 240)] {
        let session = build_session(stations, extra, &config);
        let end = format!("s{}", stations - 1);
        for strategy in [RouteSearch::Exhaustive, RouteSearch::BreadthFirst] {
            let name = format!("dense_{stations}_{extra}");
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), &name),
                session.store(),
                |b, store| {
                    b.iter(|| {
                        let found = route::search(black_box(store), "s0", &end, config.max_route_depth, strategy);
                        black_box(found.map(|steps| steps.len()));
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::metro();
    let render = RenderConfig::default();
    for (stations, extra) in [(20usize, 20usize), (120, 300)] {
        let name = format!("dense_{stations}_{extra}");
        let session = build_session(stations, extra, &LayoutConfig::default());
        let scene = session.scene();
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            b.iter(|| {
                let svg = render_svg(black_box(scene), &theme, &render);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingest, bench_scene, bench_route, bench_render);
criterion_main!(benches);

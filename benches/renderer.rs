use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tubemap_renderer::map::DrawOptions;
use tubemap_renderer::render::render_map_with;
use tubemap_renderer::text_metrics::EstimatedMetrics;
use tubemap_renderer::{Config, Direction, Vector2, parse_map, route};

/// A zig-zag line of `stations` stations, each joined to the next in both
/// directions.
fn zigzag_source(stations: usize) -> String {
    let mut out = String::from("line main 0019a8\nline error ff00ff\n");
    for i in 0..stations {
        let y = if i % 2 == 0 { 0 } else { 7 };
        out.push_str(&format!("station S{i} Station\\n{i} {},{y}\n", i * 12));
        out.push_str("platform 1 E main\nplatform 2 W main\n");
    }
    for i in 0..stations.saturating_sub(1) {
        out.push_str(&format!("track S{i}-1 S{}-1 main\n", i + 1));
        out.push_str(&format!("track S{}-2 S{i}-2 main\n", i + 1));
    }
    out
}

fn fixture(name: &str) -> &'static str {
    match name {
        "central" => include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/central.map")),
        "junction" => include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/junction.map")),
        _ => "",
    }
}

fn bench_router(c: &mut Criterion) {
    let cases = [
        ("straight", Vector2::new(100.0, 0.0), Direction::E),
        ("single_bend", Vector2::new(100.0, 50.0), Direction::SE),
        ("double_bend", Vector2::new(50.0, 50.0), Direction::S),
        ("dogleg", Vector2::new(100.0, 20.0), Direction::E),
        ("backtrack", Vector2::new(-80.0, 30.0), Direction::W),
    ];
    let mut group = c.benchmark_group("route");
    for (name, end, end_dir) in cases {
        group.bench_function(name, |b| {
            b.iter(|| route(black_box(Vector2::ZERO), Direction::E, black_box(end), end_dir))
        });
    }
    group.finish();
}

fn bench_fixtures(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("render");
    for name in ["central", "junction"] {
        let source = fixture(name);
        group.bench_with_input(BenchmarkId::new("parse", name), source, |b, source| {
            b.iter(|| parse_map(black_box(source), &config))
        });
        let Ok(map) = parse_map(source, &config) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("draw", name), &map, |b, map| {
            b.iter(|| render_map_with(black_box(map), &config, &DrawOptions::default(), &EstimatedMetrics))
        });
    }
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("zigzag");
    for stations in [10usize, 100, 500] {
        let source = zigzag_source(stations);
        let Ok(map) = parse_map(&source, &config) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(stations), &map, |b, map| {
            b.iter(|| render_map_with(black_box(map), &config, &DrawOptions::default(), &EstimatedMetrics))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_router, bench_fixtures, bench_scaling);
criterion_main!(benches);

use std::path::Path;

use tubemap_renderer::map::TubeMap;
use tubemap_renderer::render::{RenderOutput, render_map_with};
use tubemap_renderer::routing::MAX_ROUTE_STEPS;
use tubemap_renderer::text_metrics::EstimatedMetrics;
use tubemap_renderer::{Config, DrawOptions, Vector2, parse_map, save_offsets};

fn read_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture read failed")
}

fn load(name: &str) -> TubeMap {
    parse_map(&read_fixture(name), &Config::default()).expect("parse failed")
}

fn render(map: &TubeMap, options: &DrawOptions) -> RenderOutput {
    render_map_with(map, &Config::default(), options, &EstimatedMetrics)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN coordinate");
}

#[test]
fn render_all_fixtures() {
    for fixture in ["central.map", "junction.map"] {
        let map = load(fixture);
        let output = render(&map, &DrawOptions::default());
        assert_valid_svg(&output.svg, fixture);
        assert_eq!(output.report.routes.len(), map.tracks().len(), "{fixture}");

        for (route, track) in output.report.routes.iter().zip(map.tracks()) {
            let path = &route.path;
            assert!(path.len() >= 2, "{fixture}: {} -> {}", route.from, route.to);
            assert!(path.len() <= MAX_ROUTE_STEPS + 2, "{fixture}: {} -> {}", route.from, route.to);

            let ends = map.track_ends(track).unwrap();
            assert_eq!(path.start(), ends.start_point);
            if !path.is_truncated() {
                assert_eq!(path.end(), ends.end_point);
            }

            // Every run lies along the heading recorded for it. The final run
            // is only straight to within the router's rounding.
            for pair in path.points().windows(2) {
                let run = pair[1].point - pair[0].point;
                if run.length() < 1e-9 {
                    continue;
                }
                let heading = pair[1].incoming.unwrap().vector();
                let unit = run.normalize();
                assert!(
                    (unit.x * heading.y - unit.y * heading.x).abs() < 0.02,
                    "{fixture}: {} -> {} runs {run} against {heading}",
                    route.from,
                    route.to
                );
            }
        }
    }
}

#[test]
fn central_line_routes_fully() {
    let map = load("central.map");
    let output = render(&map, &DrawOptions::default());
    let report = &output.report;
    assert_eq!(report.routes.len(), 6);
    assert_eq!(report.truncated_routes(), 0);
    assert_eq!(report.platforms_drawn, 8);
    assert_eq!(report.labels_drawn, 4);

    let to_bank = report.routes.iter().find(|r| r.to == "BNK-1").unwrap();
    assert_eq!(to_bank.path.len(), 3);
    let corner = to_bank.path.points()[1].point;
    assert!((corner.y + 5.0).abs() < 1e-9, "corner {corner}");

    let straight = report.routes.iter().filter(|r| r.path.len() == 2).count();
    assert_eq!(straight, 4);
}

#[test]
fn junction_draws_every_platform_style() {
    let map = load("junction.map");
    let output = render(&map, &DrawOptions::default());
    // The waypoint's two platforms are never drawn.
    assert_eq!(output.report.platforms_drawn, 14);
    assert_eq!(output.report.labels_drawn, 7);
    assert!(output.svg.contains("stroke-dasharray"));
    assert!(output.svg.contains(">Portland<"));

    let order: Vec<&str> = map
        .draw_order()
        .iter()
        .map(|&id| map.station(id).unwrap().code.as_str())
        .collect();
    assert_eq!(order.first(), Some(&"LRD"));
    assert_eq!(order.last(), Some(&"FRD"));
}

#[test]
fn markings_add_an_overlay() {
    let map = load("central.map");
    let plain = render(&map, &DrawOptions::default());
    let marked = render(
        &map,
        &DrawOptions {
            markings: true,
            ..DrawOptions::default()
        },
    );
    let paths = |svg: &str| svg.matches("<path").count();
    // One cross per station plus one dot per platform.
    assert_eq!(paths(&marked.svg) - paths(&plain.svg), 4 + 8);
    assert_eq!(marked.svg.matches("font-size=\"4.00\"").count(), 8);
}

#[test]
fn saved_offsets_reload_to_the_same_map() {
    let source = read_fixture("junction.map");
    let config = Config::default();
    let map = parse_map(&source, &config).unwrap();
    let saved = save_offsets(&source, &map, config.render.coordinate_scale);
    let reloaded = parse_map(&saved, &config).unwrap();

    assert_eq!(reloaded.stations().len(), map.stations().len());
    for (id, station) in map.stations().iter().enumerate() {
        let again = reloaded.station_by_code(&station.code).unwrap();
        assert_eq!(again.offset, station.offset, "{}", station.code);
        assert_eq!(again.name, station.name);
        assert_eq!(reloaded.station_offset(id), map.station_offset(id));
    }
    assert_eq!(reloaded.tracks().len(), map.tracks().len());
}

#[test]
fn moved_station_pulls_its_relatives() {
    let mut map = load("junction.map");
    let before = map.station_offset(map.station_id("BKJ").unwrap());
    map.move_station("BKS", Vector2::new(10.0, 0.0)).unwrap();
    let after = map.station_offset(map.station_id("BKJ").unwrap());
    assert_eq!(after - before, Vector2::new(10.0, 0.0));

    let inside: Vec<&str> = map
        .stations_inside_bounds(Vector2::new(-5.0, -5.0), Vector2::new(200.0, 100.0))
        .iter()
        .map(|s| s.code.as_str())
        .collect();
    // BKJ is placed relative to BKS, so it is left to its anchor.
    assert_eq!(inside, vec!["BKS", "ESQ"]);
}

use crate::map::{DrawReport, TubeMap};
use crate::surface::Color;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub lines: Vec<LineDump>,
    pub stations: Vec<StationDump>,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Serialize)]
pub struct LineDump {
    pub code: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StationDump {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub relative_to: Option<String>,
    pub platforms: Vec<PlatformDump>,
}

#[derive(Debug, Serialize)]
pub struct PlatformDump {
    pub number: String,
    pub direction: String,
    pub line: String,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct RouteEntry {
    pub from: String,
    pub to: String,
    pub line: String,
    pub subtrack: bool,
    pub truncated: bool,
    pub points: Vec<[f64; 2]>,
    /// Heading arriving at each point after the first.
    pub headings: Vec<String>,
}

impl RouteDump {
    pub fn from_report(map: &TubeMap, report: &DrawReport) -> Self {
        let lines = map
            .lines()
            .iter()
            .map(|line| LineDump {
                code: line.code.clone(),
                colors: line.colors.iter().map(|c| hex(*c)).collect(),
            })
            .collect();

        let stations = map
            .stations()
            .iter()
            .enumerate()
            .map(|(id, station)| {
                let origin = map.station_offset(id);
                let platforms = station
                    .platforms
                    .iter()
                    .map(|platform| PlatformDump {
                        number: platform.number.clone(),
                        direction: platform.direction.to_string(),
                        line: map
                            .line(platform.line)
                            .map(|line| line.code.clone())
                            .unwrap_or_default(),
                        start: platform.start_point(origin).to_tuple().into(),
                        end: platform.end_point(origin).to_tuple().into(),
                    })
                    .collect();
                StationDump {
                    code: station.code.clone(),
                    name: station.name.clone(),
                    kind: station.kind.keyword().to_string(),
                    x: origin.x,
                    y: origin.y,
                    relative_to: station
                        .relative_to
                        .and_then(|anchor| map.station(anchor))
                        .map(|anchor| anchor.code.clone()),
                    platforms,
                }
            })
            .collect();

        let routes = report
            .routes
            .iter()
            .map(|route| RouteEntry {
                from: route.from.clone(),
                to: route.to.clone(),
                line: route.line.clone(),
                subtrack: route.subtrack,
                truncated: route.path.is_truncated(),
                points: route
                    .path
                    .points()
                    .iter()
                    .map(|p| p.point.to_tuple().into())
                    .collect(),
                headings: route
                    .path
                    .points()
                    .iter()
                    .filter_map(|p| p.incoming.map(|dir| dir.to_string()))
                    .collect(),
            })
            .collect();

        RouteDump {
            lines,
            stations,
            routes,
        }
    }
}

fn hex(color: Color) -> String {
    if color.a < 1.0 {
        format!("{}{:02x}", color.to_svg(), (color.a.clamp(0.0, 1.0) * 255.0).round() as u8)
    } else {
        color.to_svg()
    }
}

pub fn write_route_dump(path: &Path, map: &TubeMap, report: &DrawReport) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = RouteDump::from_report(map, report);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

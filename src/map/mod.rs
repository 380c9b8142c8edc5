//! The map model: lines, stations with their platforms, and the tracks
//! joining platform ends.

mod draw;
mod label;
mod platform;
mod station;

pub use draw::{DrawOptions, DrawReport, TrackRoute};
pub use label::{LabelLayout, LabelLine, layout_label};
pub use platform::{Platform, PlatformStyle};
pub use station::{Station, StationKind};

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ParseError;
use crate::geometry::{Direction, Vector2};
use crate::surface::Color;

/// Line code whose platforms are laid out but never drawn.
pub const HIDDEN_LINE: &str = "none";
/// Line used for platforms that name no (or an unknown) line.
pub const FALLBACK_LINE: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub code: String,
    pub colors: Vec<Color>,
}

impl Line {
    pub fn new(code: &str, colors: Vec<Color>) -> Self {
        Self {
            code: code.to_string(),
            colors,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.code == HIDDEN_LINE
    }
}

/// Indices of a platform within a [`TubeMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformId {
    pub station: usize,
    pub platform: usize,
}

/// A stretch of line from one platform to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub from: PlatformId,
    pub to: PlatformId,
    pub line: usize,
    pub subtrack: bool,
    /// Leave from the platform's start instead of its end, heading backwards.
    pub leaves_start: bool,
    /// Arrive at the destination's end instead of its start, heading backwards.
    pub finishes_end: bool,
}

/// Where a track starts and finishes, with the heading at each end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEnds {
    pub start_point: Vector2,
    pub start_dir: Direction,
    pub end_point: Vector2,
    pub end_dir: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct TubeMap {
    lines: Vec<Line>,
    line_index: HashMap<String, usize>,
    stations: Vec<Station>,
    station_index: HashMap<String, usize>,
    draw_order: Vec<usize>,
    tracks: Vec<Track>,
}

impl TubeMap {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lines ───────────────────────────────────────────────────────────

    /// Adds a line, replacing any earlier line with the same code.
    pub fn add_line(&mut self, line: Line) -> usize {
        if let Some(&id) = self.line_index.get(&line.code) {
            self.lines[id] = line;
            return id;
        }
        let id = self.lines.len();
        self.line_index.insert(line.code.clone(), id);
        self.lines.push(line);
        id
    }

    pub fn line_id(&self, code: &str) -> Option<usize> {
        self.line_index.get(code).copied()
    }

    pub fn line(&self, id: usize) -> Option<&Line> {
        self.lines.get(id)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    // ── Stations ────────────────────────────────────────────────────────

    /// Adds a station at the back of the draw order. A station reusing an
    /// existing code replaces it and keeps its place.
    pub fn add_station(&mut self, station: Station) -> usize {
        if let Some(&id) = self.station_index.get(&station.code) {
            self.stations[id] = station;
            return id;
        }
        let id = self.stations.len();
        self.station_index.insert(station.code.clone(), id);
        self.stations.push(station);
        self.draw_order.push(id);
        id
    }

    pub fn station_id(&self, code: &str) -> Option<usize> {
        self.station_index.get(code).copied()
    }

    pub fn station(&self, id: usize) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn station_mut(&mut self, id: usize) -> Option<&mut Station> {
        self.stations.get_mut(id)
    }

    pub fn station_by_code(&self, code: &str) -> Option<&Station> {
        self.station_id(code).and_then(|id| self.station(id))
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Absolute offset of a station, following its chain of relative
    /// positions.
    pub fn station_offset(&self, id: usize) -> Vector2 {
        let mut offset = Vector2::ZERO;
        let mut current = Some(id);
        // A chain can never be longer than the station list.
        for _ in 0..=self.stations.len() {
            let Some(station) = current.and_then(|id| self.stations.get(id)) else {
                break;
            };
            offset = offset + station.offset;
            current = station.relative_to;
        }
        offset
    }

    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    pub fn move_to_front(&mut self, id: usize) {
        self.draw_order.retain(|&other| other != id);
        self.draw_order.insert(0, id);
    }

    pub fn move_to_back(&mut self, id: usize) {
        self.draw_order.retain(|&other| other != id);
        self.draw_order.push(id);
    }

    // ── Platforms and tracks ────────────────────────────────────────────

    pub fn platform_id(&self, station_code: &str, number: &str) -> Result<PlatformId, ParseError> {
        let station = self
            .station_id(station_code)
            .ok_or_else(|| ParseError::UnknownStation(station_code.to_string()))?;
        let platform = self.stations[station]
            .platform_index(number)
            .ok_or_else(|| ParseError::UnknownPlatform {
                station: station_code.to_string(),
                platform: number.to_string(),
            })?;
        Ok(PlatformId { station, platform })
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.stations.get(id.station)?.platforms.get(id.platform)
    }

    /// `"<station>-<number>"`, as written in map files.
    pub fn platform_label(&self, id: PlatformId) -> String {
        match (self.station(id.station), self.platform(id)) {
            (Some(station), Some(platform)) => format!("{}-{}", station.code, platform.number),
            _ => format!("?{}-{}", id.station, id.platform),
        }
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_ends(&self, track: &Track) -> Option<TrackEnds> {
        let from = self.platform(track.from)?;
        let to = self.platform(track.to)?;
        let from_origin = self.station_offset(track.from.station);
        let to_origin = self.station_offset(track.to.station);

        let (start_point, start_dir) = if track.leaves_start {
            (from.start_point(from_origin), from.direction.reverse())
        } else {
            (from.end_point(from_origin), from.direction)
        };
        let (end_point, end_dir) = if track.finishes_end {
            (to.end_point(to_origin), to.direction.reverse())
        } else {
            (to.start_point(to_origin), to.direction)
        };
        Some(TrackEnds {
            start_point,
            start_dir,
            end_point,
            end_dir,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Bounding box `(min, max)` of every station's absolute offset,
    /// always including the origin.
    pub fn extents(&self) -> (Vector2, Vector2) {
        let mut min = Vector2::ZERO;
        let mut max = Vector2::ZERO;
        for id in 0..self.stations.len() {
            let offset = self.station_offset(id);
            min = Vector2::new(min.x.min(offset.x), min.y.min(offset.y));
            max = Vector2::new(max.x.max(offset.x), max.y.max(offset.y));
        }
        (min, max)
    }

    pub fn nearest_station(&self, point: Vector2) -> Option<(&Station, f64)> {
        self.stations
            .iter()
            .enumerate()
            .map(|(id, station)| (station, self.station_offset(id).distance(point)))
            .fold(None, |best: Option<(&Station, f64)>, candidate| match best {
                Some(best) if best.1 <= candidate.1 => Some(best),
                _ => Some(candidate),
            })
    }

    /// Absolutely positioned stations whose offset lies inside the box,
    /// edges included.
    pub fn stations_inside_bounds(&self, top_left: Vector2, bottom_right: Vector2) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|station| station.relative_to.is_none())
            .filter(|station| {
                let o = station.offset;
                (top_left.x..=bottom_right.x).contains(&o.x) && (top_left.y..=bottom_right.y).contains(&o.y)
            })
            .collect()
    }

    /// Shifts a station's own offset; stations placed relative to it move
    /// along.
    pub fn move_station(&mut self, code: &str, delta: Vector2) -> Result<(), ParseError> {
        let id = self
            .station_id(code)
            .ok_or_else(|| ParseError::UnknownStation(code.to_string()))?;
        let station = &mut self.stations[id];
        station.offset = station.offset + delta;
        Ok(())
    }
}

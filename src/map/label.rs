use serde::Serialize;

use crate::config::{SegmentStyle, StationConfig};
use crate::geometry::{Direction, Vector2};
use crate::stroke::PlatformSide;
use crate::text_metrics::{MeasureText, TextExtents};

use super::Station;

/// Label direction for stations that do not set one.
pub const DEFAULT_LABEL_DIRECTION: Direction = Direction::W;

/// Separator for multi-line names in map files (a literal backslash-n).
const LINE_BREAK: &str = "\\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLine {
    pub text: String,
    /// Baseline origin of the text.
    pub position: Vector2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayout {
    pub lines: Vec<LabelLine>,
    pub font_size: f64,
}

struct MeasuredLine {
    text: String,
    extents: TextExtents,
    /// Distance from the label top to this line's baseline.
    baseline: f64,
}

/// Places a station's name beside its platforms, on the side its label
/// direction points to. `None` for unnamed stations.
pub fn layout_label<M: MeasureText + ?Sized>(
    station: &Station,
    origin: Vector2,
    style: &SegmentStyle,
    config: &StationConfig,
    metrics: &M,
) -> Option<LabelLayout> {
    if station.name.trim().is_empty() {
        return None;
    }
    let label_dir = station.label_direction.unwrap_or(DEFAULT_LABEL_DIRECTION);
    let (box_min, box_max) = platform_box(station, label_dir, style.platform_distance);

    let font_size = config.label_size;
    let mut lines = Vec::new();
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    for text in station.name.split(LINE_BREAK) {
        let text = text.trim().to_string();
        let extents = metrics.text_extents(&text, font_size);
        width = width.max(extents.width);
        height += extents.height;
        lines.push(MeasuredLine {
            text,
            extents,
            baseline: height,
        });
        height += config.label_line_gap;
    }
    height -= config.label_line_gap;

    let dir = label_dir.vector();
    let (x_offset, x_align) = match sign(dir.x) {
        -1 => (box_min.x - width / 2.0, 1.0),
        0 => (0.0, 0.5),
        _ => (box_max.x + width / 2.0, 0.0),
    };
    let (y_offset, y_shift) = match sign(dir.y) {
        -1 => (
            box_min.y - height / 2.0,
            -metrics.font_extents(font_size).descent * 0.6,
        ),
        0 => (0.0, 0.0),
        _ => (box_max.y + height / 2.0, 0.0),
    };
    let center = Vector2::new(x_offset, y_offset - font_size / 8.0);
    let distance = Vector2::new(
        dir.x * config.label_distance_x,
        dir.y * config.label_distance_y,
    );

    let lines = lines
        .into_iter()
        .map(|line| {
            let line_x = -line.extents.x_bearing - width / 2.0 - (line.extents.width - width) * x_align;
            let line_y = y_shift + line.baseline - height / 2.0;
            LabelLine {
                text: line.text,
                position: center + Vector2::new(line_x, line_y) + distance + origin + station.label_offset,
            }
        })
        .collect();
    Some(LabelLayout { lines, font_size })
}

/// Bounding box of the platforms and their ties, relative to the station
/// and always containing it. Platforms lying across the label direction
/// only count their middle, so labels tuck in close to diagonal stations.
fn platform_box(station: &Station, label_dir: Direction, tie_distance: f64) -> (Vector2, Vector2) {
    let mut min = Vector2::ZERO;
    let mut max = Vector2::ZERO;
    for platform in &station.platforms {
        let across = platform.direction == label_dir.right().right()
            || platform.direction == label_dir.left().left();
        let ends = if across {
            vec![platform.mid_point(Vector2::ZERO)]
        } else {
            vec![
                platform.start_point(Vector2::ZERO),
                platform.end_point(Vector2::ZERO),
            ]
        };

        let mut points = ends.clone();
        for (side, normal) in [
            (PlatformSide::LEFT, platform.direction.left().left()),
            (PlatformSide::RIGHT, platform.direction.right().right()),
        ] {
            if platform.side.contains(side) {
                points.extend(ends.iter().map(|end| *end + normal.vector() * tie_distance));
            }
        }
        for point in points {
            min = Vector2::new(min.x.min(point.x), min.y.min(point.y));
            max = Vector2::new(max.x.max(point.x), max.y.max(point.y));
        }
    }
    (min, max)
}

fn sign(value: f64) -> i8 {
    if value.abs() < 1e-9 {
        0
    } else if value < 0.0 {
        -1
    } else {
        1
    }
}

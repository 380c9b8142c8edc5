use std::f64::consts::{FRAC_PI_8, PI, TAU};

use serde::Serialize;

use crate::config::SegmentStyle;
use crate::geometry::{Direction, Vector2};
use crate::routing::{Path, Router};
use crate::surface::{Color, Surface};
use crate::theme::Theme;

/// Which sides of a segment carry a platform tie. Combines bitwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlatformSide(u8);

impl PlatformSide {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const BOTH: Self = Self(3);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Single-letter form used in map files: `L`, `R`, `B` or `N`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "L" => Some(Self::LEFT),
            "R" => Some(Self::RIGHT),
            "B" => Some(Self::BOTH),
            "N" => Some(Self::NONE),
            _ => None,
        }
    }
}

impl Serialize for PlatformSide {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl std::ops::BitOr for PlatformSide {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What a single stroke of the path is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Halo,
    TieHalo,
    Tie,
    Main,
}

impl Layer {
    fn is_back(self) -> bool {
        matches!(self, Layer::Halo | Layer::TieHalo)
    }
}

/// A stretch of line between two platform ends, drawn in the layered tube
/// map style: white halo, optional platform ties, then the line color.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_point: Vector2,
    pub start_dir: Direction,
    pub end_point: Vector2,
    pub end_dir: Direction,
    pub colors: Vec<Color>,
    pub platform: PlatformSide,
    pub platform_color: Option<Color>,
    /// Drawn under another track, so no halo of its own.
    pub subtrack: bool,
    pub dashed: bool,
}

impl Segment {
    pub fn new(start_point: Vector2, start_dir: Direction, end_point: Vector2, end_dir: Direction) -> Self {
        Self {
            start_point,
            start_dir,
            end_point,
            end_dir,
            colors: vec![Color::TRANSPARENT],
            platform: PlatformSide::NONE,
            platform_color: None,
            subtrack: false,
            dashed: false,
        }
    }

    pub fn with_colors(mut self, colors: &[Color]) -> Self {
        if !colors.is_empty() {
            self.colors = colors.to_vec();
        }
        self
    }

    pub fn with_platform(mut self, platform: PlatformSide, color: Option<Color>) -> Self {
        self.platform = platform;
        self.platform_color = color;
        self
    }

    pub fn subtrack(mut self, subtrack: bool) -> Self {
        self.subtrack = subtrack;
        self
    }

    pub fn dashed(mut self, dashed: bool) -> Self {
        self.dashed = dashed;
        self
    }

    pub fn primary_color(&self) -> Color {
        self.colors.first().copied().unwrap_or(Color::TRANSPARENT)
    }

    pub fn route(&self, style: &SegmentStyle) -> Path {
        Router::new(style.min_length).route(self.start_point, self.start_dir, self.end_point, self.end_dir)
    }

    /// Routes the segment and strokes every layer onto `surface`. Returns
    /// the routed path.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, style: &SegmentStyle, theme: &Theme) -> Path {
        let path = self.route(style);

        if !self.subtrack {
            self.stroke_layer(surface, &path, Layer::Halo, style, theme);
        }
        for (side, normal) in [
            (PlatformSide::LEFT, self.start_dir.left().left()),
            (PlatformSide::RIGHT, self.start_dir.right().right()),
        ] {
            if !self.platform.contains(side) {
                continue;
            }
            surface.save();
            surface.translate(normal.vector() * style.platform_distance);
            if !self.subtrack {
                self.stroke_layer(surface, &path, Layer::TieHalo, style, theme);
            }
            self.stroke_layer(surface, &path, Layer::Tie, style, theme);
            surface.restore();
        }
        self.stroke_layer(surface, &path, Layer::Main, style, theme);

        path
    }

    fn stroke_layer<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        path: &Path,
        layer: Layer,
        style: &SegmentStyle,
        theme: &Theme,
    ) {
        trace_path(surface, path, style.radius);

        let end = path.end();
        if layer.is_back() {
            surface.line_to(end);
        } else {
            surface.line_to(end + self.end_dir.vector() * style.overshoot);
        }

        let (color, width) = match layer {
            Layer::Halo => (theme.halo_color, style.back_width),
            Layer::TieHalo => (theme.halo_color, style.platform_back_width),
            Layer::Tie => (
                self.platform_color.unwrap_or(theme.platform_color),
                style.platform_width,
            ),
            Layer::Main => (self.primary_color(), style.width),
        };
        surface.set_color(color);
        surface.set_line_width(width);
        let dashed = self.dashed && layer == Layer::Main;
        if dashed {
            surface.set_dash(Some(&style.dash));
        }
        surface.stroke();
        if dashed {
            surface.set_dash(None);
        }
    }
}

/// Moves to the path start and lays out every corner as a fixed-radius arc
/// tangent to both runs. Leaves the pen at the last arc; the caller draws
/// the final run.
pub fn trace_path<S: Surface + ?Sized>(surface: &mut S, path: &Path, radius: f64) {
    surface.move_to(path.start());
    for (corner, dir, next_dir) in path.corners() {
        let delta = dir.delta(next_dir);
        if delta == 0 {
            surface.line_to(corner);
            continue;
        }
        // Away from the inside of the turn.
        let out = -(dir.vector() - next_dir.vector()).normalize();
        let center = corner + out * (radius / (f64::from(delta) * FRAC_PI_8).cos());
        if delta > 0 {
            surface.arc(
                center,
                radius,
                wrap_angle(dir.angle() - PI),
                wrap_angle(next_dir.angle() - PI),
                true,
            );
        } else {
            surface.arc(
                center,
                radius,
                wrap_angle(dir.angle()),
                wrap_angle(next_dir.angle()),
                false,
            );
        }
    }
}

fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RoutedPoint;
    use crate::surface::{DrawCommand, RecordingSurface};
    use std::f64::consts::FRAC_PI_4;

    /// Tangent angles for a single-octant turn, as offsets of the headings.
    fn octant_turn_angles(dir: Direction, next_dir: Direction) -> (f64, f64) {
        if dir.delta(next_dir) > 0 {
            (
                wrap_angle(next_dir.angle() + 3.0 * FRAC_PI_4),
                wrap_angle(dir.angle() - 3.0 * FRAC_PI_4),
            )
        } else {
            (
                wrap_angle(next_dir.angle() + FRAC_PI_4),
                wrap_angle(dir.angle() - FRAC_PI_4),
            )
        }
    }

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    #[test]
    fn layers_draw_halo_ties_then_main() {
        let theme = Theme::tube();
        let style = SegmentStyle::default();
        let segment = Segment::new(v(0.0, 0.0), Direction::E, v(22.0, 0.0), Direction::E)
            .with_colors(&[red()])
            .with_platform(PlatformSide::BOTH, None);
        let mut surface = RecordingSurface::new();
        segment.draw(&mut surface, &style, &theme);

        assert_eq!(
            surface.strokes(),
            vec![
                (Color::WHITE, 5.0),
                (Color::WHITE, 4.0),
                (theme.platform_color, 2.0),
                (Color::WHITE, 4.0),
                (theme.platform_color, 2.0),
                (red(), 3.0),
            ]
        );
        let translations: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Translate(offset) => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(translations.len(), 2);
        assert!(translations[0].approx_eq(v(0.0, -3.5), 1e-12));
        assert!(translations[1].approx_eq(v(0.0, 3.5), 1e-12));
        let saves = surface.commands.iter().filter(|c| **c == DrawCommand::Save).count();
        let restores = surface.commands.iter().filter(|c| **c == DrawCommand::Restore).count();
        assert_eq!((saves, restores), (2, 2));
    }

    #[test]
    fn subtrack_skips_every_halo() {
        let theme = Theme::tube();
        let segment = Segment::new(v(0.0, 0.0), Direction::S, v(0.0, 30.0), Direction::S)
            .with_colors(&[red()])
            .with_platform(PlatformSide::LEFT, None)
            .subtrack(true);
        let mut surface = RecordingSurface::new();
        segment.draw(&mut surface, &SegmentStyle::default(), &theme);
        assert_eq!(
            surface.strokes(),
            vec![(theme.platform_color, 2.0), (red(), 3.0)]
        );
    }

    #[test]
    fn main_stroke_overshoots_but_halo_does_not() {
        let segment = Segment::new(v(0.0, 0.0), Direction::E, v(100.0, 0.0), Direction::E);
        let mut surface = RecordingSurface::new();
        segment.draw(&mut surface, &SegmentStyle::default(), &Theme::tube());
        let ends: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec![v(100.0, 0.0), v(100.5, 0.0)]);
    }

    #[test]
    fn dash_applies_to_main_stroke_only() {
        let style = SegmentStyle::default();
        let segment = Segment::new(v(0.0, 0.0), Direction::E, v(14.0, 0.0), Direction::E).dashed(true);
        let mut surface = RecordingSurface::new();
        segment.draw(&mut surface, &style, &Theme::tube());
        let dash_at = surface
            .commands
            .iter()
            .position(|c| *c == DrawCommand::SetDash(Some(style.dash.clone())))
            .unwrap();
        let first_stroke = surface.commands.iter().position(|c| *c == DrawCommand::Stroke).unwrap();
        assert!(dash_at > first_stroke);
        assert_eq!(surface.commands.last(), Some(&DrawCommand::SetDash(None)));
    }

    #[test]
    fn arc_is_tangent_to_both_runs() {
        let radius = 7.0;
        let segment = Segment::new(v(0.0, 0.0), Direction::E, v(100.0, 50.0), Direction::SE);
        let path = segment.route(&SegmentStyle::default());
        let mut surface = RecordingSurface::new();
        trace_path(&mut surface, &path, radius);
        let Some(DrawCommand::Arc { center, start, end, clockwise, .. }) = surface.commands.get(1) else {
            panic!("expected an arc, got {:?}", surface.commands);
        };
        assert!(*clockwise);
        // Incoming run is y = 0, so the center sits one radius below it.
        assert!((center.y - radius).abs() < 1e-9);
        // Outgoing run is the SE line through (50, 0).
        let to_center = *center - v(50.0, 0.0);
        let normal = Direction::SW.vector();
        assert!((to_center.dot(normal) - radius).abs() < 1e-9);
        let start_point = *center + v(start.cos(), start.sin()) * radius;
        assert!(start_point.y.abs() < 1e-9);
        let end_point = *center + v(end.cos(), end.sin()) * radius;
        let along = end_point - v(50.0, 0.0);
        assert!((along.proj_onto(Direction::SE.vector()) - along.length()).abs() < 1e-6);
    }

    #[test]
    fn general_angles_match_octant_offsets() {
        for dir in Direction::ALL {
            for next in [dir.left(), dir.right()] {
                let mut surface = RecordingSurface::new();
                let path = Path::from_points(vec![
                    RoutedPoint { point: v(0.0, 0.0), incoming: None },
                    RoutedPoint { point: v(1.0, 1.0), incoming: Some(dir) },
                    RoutedPoint { point: v(2.0, 2.0), incoming: Some(next) },
                ])
                .unwrap();
                trace_path(&mut surface, &path, 7.0);
                let Some(DrawCommand::Arc { start, end, .. }) = surface.commands.get(1) else {
                    panic!("expected an arc");
                };
                let (expected_start, expected_end) = octant_turn_angles(dir, next);
                let same = |a: f64, b: f64| {
                    let diff = (a - b).rem_euclid(TAU);
                    diff < 1e-9 || TAU - diff < 1e-9
                };
                assert!(same(*start, expected_start), "{dir}->{next}");
                assert!(same(*end, expected_end), "{dir}->{next}");
            }
        }
    }

    #[test]
    fn platform_side_bits() {
        assert!(PlatformSide::BOTH.contains(PlatformSide::LEFT));
        assert!(PlatformSide::BOTH.contains(PlatformSide::RIGHT));
        assert!(!PlatformSide::LEFT.contains(PlatformSide::RIGHT));
        assert!(!PlatformSide::NONE.contains(PlatformSide::NONE));
        assert_eq!(PlatformSide::LEFT | PlatformSide::RIGHT, PlatformSide::BOTH);
        assert_eq!(PlatformSide::from_code("r"), Some(PlatformSide::RIGHT));
        assert_eq!(PlatformSide::from_code("X"), None);
    }
}

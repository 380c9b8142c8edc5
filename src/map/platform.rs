use serde::Serialize;

use crate::geometry::{Direction, Vector2};
use crate::stroke::{PlatformSide, Segment};
use crate::surface::Color;
use crate::theme::Theme;

use super::Line;

/// Platform variants. Each selects a row of the style table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlatformStyle {
    Standard,
    /// Zero-length, never drawn; used where tracks merge or split.
    Points,
    Depot,
    Sidings,
    Disused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StyleSpec {
    length: f64,
    drawn: bool,
    dashed: bool,
    ties: bool,
    disused: bool,
}

impl PlatformStyle {
    const fn spec(self) -> StyleSpec {
        match self {
            PlatformStyle::Standard => StyleSpec {
                length: 22.0,
                drawn: true,
                dashed: false,
                ties: true,
                disused: false,
            },
            PlatformStyle::Points => StyleSpec {
                length: 0.0,
                drawn: false,
                dashed: false,
                ties: false,
                disused: false,
            },
            PlatformStyle::Depot => StyleSpec {
                length: 14.0,
                drawn: true,
                dashed: true,
                ties: false,
                disused: false,
            },
            PlatformStyle::Sidings => StyleSpec {
                length: 6.0,
                drawn: true,
                dashed: true,
                ties: false,
                disused: false,
            },
            PlatformStyle::Disused => StyleSpec {
                length: 22.0,
                drawn: true,
                dashed: false,
                ties: true,
                disused: true,
            },
        }
    }

    pub fn length(self) -> f64 {
        self.spec().length
    }

    pub fn is_drawn(self) -> bool {
        self.spec().drawn
    }

    pub fn is_dashed(self) -> bool {
        self.spec().dashed
    }

    /// Color of the platform ties, or `None` for styles without ties.
    pub fn tie_color(self, theme: &Theme) -> Option<Color> {
        let spec = self.spec();
        if !spec.ties {
            None
        } else if spec.disused {
            Some(theme.disused_platform_color)
        } else {
            Some(theme.platform_color)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    pub number: String,
    pub direction: Direction,
    /// Offset from the station origin, maintained by the station layout.
    pub offset: Vector2,
    /// Position within the station's bucket for this direction.
    pub offset_number: usize,
    pub line: usize,
    pub side: PlatformSide,
    pub style: PlatformStyle,
}

impl Platform {
    pub fn half_length(&self) -> Vector2 {
        self.direction.vector() * (self.style.length() / 2.0)
    }

    pub fn mid_point(&self, station_offset: Vector2) -> Vector2 {
        station_offset + self.offset
    }

    pub fn start_point(&self, station_offset: Vector2) -> Vector2 {
        self.mid_point(station_offset) - self.half_length()
    }

    pub fn end_point(&self, station_offset: Vector2) -> Vector2 {
        self.mid_point(station_offset) + self.half_length()
    }

    /// The segment that draws this platform, if anything is drawn at all.
    pub fn segment(&self, station_offset: Vector2, line: &Line, theme: &Theme) -> Option<Segment> {
        if !self.style.is_drawn() || line.is_hidden() {
            return None;
        }
        let tie_color = self.style.tie_color(theme);
        let side = if tie_color.is_some() {
            self.side
        } else {
            PlatformSide::NONE
        };
        Some(
            Segment::new(
                self.start_point(station_offset),
                self.direction,
                self.end_point(station_offset),
                self.direction,
            )
            .with_colors(&line.colors)
            .with_platform(side, tie_color)
            .dashed(self.style.is_dashed()),
        )
    }
}

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::{Direction, Vector2};
use crate::stroke::PlatformSide;

use super::platform::{Platform, PlatformStyle};

/// The directive a station was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StationKind {
    Station,
    Waypoint,
    Depot,
    Sidings,
    Disused,
}

impl StationKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "station" => Some(Self::Station),
            "waypoint" => Some(Self::Waypoint),
            "depot" => Some(Self::Depot),
            "sidings" => Some(Self::Sidings),
            "disstation" => Some(Self::Disused),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Waypoint => "waypoint",
            Self::Depot => "depot",
            Self::Sidings => "sidings",
            Self::Disused => "disstation",
        }
    }

    pub fn platform_style(self) -> PlatformStyle {
        match self {
            Self::Station => PlatformStyle::Standard,
            Self::Waypoint => PlatformStyle::Points,
            Self::Depot => PlatformStyle::Depot,
            Self::Sidings => PlatformStyle::Sidings,
            Self::Disused => PlatformStyle::Disused,
        }
    }
}

/// A place on the map that lines go to and from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub code: String,
    pub name: String,
    pub kind: StationKind,
    /// Own offset; absolute unless `relative_to` is set.
    pub offset: Vector2,
    /// Index of the station this one is positioned against.
    pub relative_to: Option<usize>,
    pub platforms: Vec<Platform>,
    pub label_direction: Option<Direction>,
    pub label_offset: Vector2,
    #[serde(skip)]
    placed: HashMap<Direction, usize>,
}

impl Station {
    pub fn new(code: &str, name: &str, kind: StationKind, offset: Vector2, relative_to: Option<usize>) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            offset,
            relative_to,
            platforms: Vec::new(),
            label_direction: None,
            label_offset: Vector2::ZERO,
            placed: HashMap::new(),
        }
    }

    pub fn platform_index(&self, number: &str) -> Option<usize> {
        self.platforms.iter().position(|p| p.number == number)
    }

    /// How many platforms share the bucket of `direction` (opposite
    /// headings share one).
    pub fn bucket_count(&self, direction: Direction) -> usize {
        self.placed.get(&direction.normalized()).copied().unwrap_or(0)
    }

    /// Adds a platform and re-spaces every platform so each bucket sits
    /// centred on the station, `gap` apart, perpendicular to its heading.
    /// Re-adding an existing number replaces that platform in place.
    pub fn add_platform(
        &mut self,
        number: &str,
        direction: Direction,
        line: usize,
        side: PlatformSide,
        gap: f64,
    ) -> usize {
        let bucket = direction.normalized();
        let count = self.placed.entry(bucket).or_insert(0);
        *count += 1;
        let platform = Platform {
            number: number.to_string(),
            direction,
            offset: Vector2::ZERO,
            offset_number: *count - 1,
            line,
            side,
            style: self.kind.platform_style(),
        };
        let index = match self.platform_index(number) {
            Some(existing) => {
                self.platforms[existing] = platform;
                existing
            }
            None => {
                self.platforms.push(platform);
                self.platforms.len() - 1
            }
        };

        for platform in &mut self.platforms {
            let bucket = platform.direction.normalized();
            let count = self.placed.get(&bucket).copied().unwrap_or(0) as f64;
            platform.offset = bucket.right().right().vector()
                * (platform.offset_number as f64 + 0.5 - count / 2.0)
                * gap;
        }
        index
    }
}

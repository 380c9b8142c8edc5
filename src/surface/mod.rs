mod recording;
mod svg;

pub use recording::{DrawCommand, RecordingSurface};
pub use svg::SvgSurface;

use serde::Serialize;

use crate::error::ParseError;
use crate::geometry::Vector2;

/// RGBA with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `rrggbb` or `rrggbbaa`, with or without a leading `#`.
    pub fn from_hex(token: &str) -> Result<Self, ParseError> {
        let hex = token.strip_prefix('#').unwrap_or(token);
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(ParseError::BadColor(token.to_string()));
        }
        let channel = |idx: usize| {
            u8::from_str_radix(&hex[idx..idx + 2], 16)
                .map(|value| f64::from(value) / 255.0)
                .map_err(|_| ParseError::BadColor(token.to_string()))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    pub fn to_svg(self) -> String {
        let scale = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            scale(self.r),
            scale(self.g),
            scale(self.b)
        )
    }
}

/// A stateful vector canvas. Commands are applied in call order, so later
/// strokes cover earlier ones.
///
/// Arc angles are radians from the +x axis, increasing clockwise on the
/// y-down canvas; `clockwise` selects the increasing-angle sweep.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vector2);
    fn scale(&mut self, factor: f64);

    fn move_to(&mut self, point: Vector2);
    fn line_to(&mut self, point: Vector2);
    fn arc(&mut self, center: Vector2, radius: f64, start: f64, end: f64, clockwise: bool);

    fn set_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    fn set_dash(&mut self, pattern: Option<&[f64]>);

    fn stroke(&mut self);
    fn fill(&mut self);

    /// Draws `text` with its baseline origin at `position` in the current
    /// color.
    fn show_text(&mut self, position: Vector2, text: &str, font_size: f64);
}

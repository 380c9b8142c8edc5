use std::f64::consts::{PI, TAU};
use std::fmt::Write;

use super::{Color, Surface};
use crate::geometry::Vector2;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
struct GraphicsState {
    origin: Vector2,
    scale: f64,
    color: Color,
    line_width: f64,
    dash: Option<Vec<f64>>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            origin: Vector2::ZERO,
            scale: 1.0,
            color: Color::BLACK,
            line_width: 2.0,
            dash: None,
        }
    }
}

/// Collects drawing commands as SVG elements.
///
/// Transforms are applied to coordinates as they are emitted, so the output
/// is a flat list of `<path>` and `<text>` elements in draw order.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: String,
    current: Option<Vector2>,
    body: String,
    font_family: String,
}

impl SvgSurface {
    pub fn new(font_family: &str) -> Self {
        Self {
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: String::new(),
            current: None,
            body: String::new(),
            font_family: font_family.to_string(),
        }
    }

    /// Elements emitted so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Wraps the body in an `<svg>` document of the given size.
    pub fn finish(self, width: f64, height: f64, background: &str) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{background}\"/>"
        ));
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn to_device(&self, point: Vector2) -> Vector2 {
        self.state.origin + point * self.state.scale
    }

    fn push_point(&mut self, command: char, point: Vector2) {
        let device = self.to_device(point);
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        let _ = write!(self.path, "{command} {:.2} {:.2}", device.x, device.y);
        self.current = Some(point);
    }

    fn push_arc_to(&mut self, radius: f64, sweep: f64, clockwise: bool, end: Vector2) {
        let device = self.to_device(end);
        let large = u8::from(sweep > PI);
        let sweep_flag = u8::from(clockwise);
        let r = radius * self.state.scale;
        let _ = write!(
            self.path,
            " A {r:.2} {r:.2} 0 {large} {sweep_flag} {:.2} {:.2}",
            device.x, device.y
        );
        self.current = Some(end);
    }

    /// Quoted color value plus an opacity attribute when translucent.
    fn paint(&self, opacity_attr: &str) -> String {
        let color = self.state.color;
        let mut attrs = format!("\"{}\"", color.to_svg());
        if color.a < 1.0 {
            let _ = write!(attrs, " {opacity_attr}=\"{:.3}\"", color.a.clamp(0.0, 1.0));
        }
        attrs
    }

    fn take_path(&mut self) -> Option<String> {
        self.current = None;
        if self.path.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.path))
    }
}

fn point_on_circle(center: Vector2, radius: f64, angle: f64) -> Vector2 {
    center + Vector2::new(angle.cos(), angle.sin()) * radius
}

impl Surface for SvgSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vector2) {
        self.state.origin = self.state.origin + offset * self.state.scale;
    }

    fn scale(&mut self, factor: f64) {
        self.state.scale *= factor;
    }

    fn move_to(&mut self, point: Vector2) {
        self.push_point('M', point);
    }

    fn line_to(&mut self, point: Vector2) {
        if self.current.is_some() {
            self.push_point('L', point);
        } else {
            self.push_point('M', point);
        }
    }

    fn arc(&mut self, center: Vector2, radius: f64, start: f64, end: f64, clockwise: bool) {
        let from = point_on_circle(center, radius, start);
        self.line_to(from);

        let mut sweep = if clockwise { end - start } else { start - end };
        while sweep < 0.0 {
            sweep += TAU;
        }
        if sweep <= EPSILON {
            return;
        }
        let sign = if clockwise { 1.0 } else { -1.0 };
        // A single SVG arc command cannot describe a full turn.
        if sweep > PI {
            let half = start + sign * sweep / 2.0;
            self.push_arc_to(radius, sweep / 2.0, clockwise, point_on_circle(center, radius, half));
            sweep /= 2.0;
        }
        self.push_arc_to(radius, sweep, clockwise, point_on_circle(center, radius, end));
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_dash(&mut self, pattern: Option<&[f64]>) {
        self.state.dash = pattern.filter(|p| !p.is_empty()).map(<[f64]>::to_vec);
    }

    fn stroke(&mut self) {
        let Some(d) = self.take_path() else {
            return;
        };
        let stroke = self.paint("stroke-opacity");
        let width = self.state.line_width * self.state.scale;
        let _ = write!(
            self.body,
            "<path d=\"{d}\" fill=\"none\" stroke={stroke} stroke-width=\"{width:.2}\""
        );
        if let Some(dash) = &self.state.dash {
            let pattern: Vec<String> = dash
                .iter()
                .map(|len| format!("{:.2}", len * self.state.scale))
                .collect();
            let _ = write!(self.body, " stroke-dasharray=\"{}\"", pattern.join(" "));
        }
        self.body.push_str("/>");
    }

    fn fill(&mut self) {
        let Some(d) = self.take_path() else {
            return;
        };
        let fill = self.paint("fill-opacity");
        let _ = write!(self.body, "<path d=\"{d}\" fill={fill}/>");
    }

    fn show_text(&mut self, position: Vector2, text: &str, font_size: f64) {
        let device = self.to_device(position);
        let fill = self.paint("fill-opacity");
        let _ = write!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" fill={fill}>{}</text>",
            device.x,
            device.y,
            escape_xml(&self.font_family),
            font_size * self.state.scale,
            escape_xml(text)
        );
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

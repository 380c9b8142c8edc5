use serde::Serialize;

use super::{Color, Surface};
use crate::geometry::Vector2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(Vector2),
    Scale(f64),
    MoveTo(Vector2),
    LineTo(Vector2),
    Arc {
        center: Vector2,
        radius: f64,
        start: f64,
        end: f64,
        clockwise: bool,
    },
    SetColor(Color),
    SetLineWidth(f64),
    SetDash(Option<Vec<f64>>),
    Stroke,
    Fill,
    ShowText {
        position: Vector2,
        text: String,
        font_size: f64,
    },
}

/// Keeps every command it receives, for inspection and dumps.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color and width in effect at each `stroke`, in order.
    pub fn strokes(&self) -> Vec<(Color, f64)> {
        let mut color = Color::BLACK;
        let mut width = 2.0;
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::SetColor(c) => color = *c,
                DrawCommand::SetLineWidth(w) => width = *w,
                DrawCommand::Stroke => out.push((color, width)),
                _ => {}
            }
        }
        out
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vector2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn scale(&mut self, factor: f64) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn move_to(&mut self, point: Vector2) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Vector2) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn arc(&mut self, center: Vector2, radius: f64, start: f64, end: f64, clockwise: bool) {
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
            clockwise,
        });
    }

    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }

    fn set_dash(&mut self, pattern: Option<&[f64]>) {
        self.commands
            .push(DrawCommand::SetDash(pattern.map(<[f64]>::to_vec)));
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn show_text(&mut self, position: Vector2, text: &str, font_size: f64) {
        self.commands.push(DrawCommand::ShowText {
            position,
            text: text.to_string(),
            font_size,
        });
    }
}

use crate::surface::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub halo_color: Color,
    pub platform_color: Color,
    pub disused_platform_color: Color,
    pub label_color: Color,
    pub markings_color: Color,
    pub markings_text_color: Color,
}

impl Theme {
    /// White paper, grey platform ties, dark blue station names.
    pub fn tube() -> Self {
        Self {
            font_family: "LondonTwo, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            halo_color: Color::WHITE,
            platform_color: Color::rgb(0.5, 0.5, 0.5),
            disused_platform_color: Color::rgb(0.8, 0.8, 0.8),
            label_color: Color::rgb(0.0, 51.0 / 255.0, 102.0 / 255.0),
            markings_color: Color::rgba(1.0, 0.0, 1.0, 0.6),
            markings_text_color: Color::rgb(0.0, 0.0, 0.4),
        }
    }

    pub fn night() -> Self {
        Self {
            font_family: "LondonTwo, sans-serif".to_string(),
            background: "#10141C".to_string(),
            halo_color: Color::rgb(16.0 / 255.0, 20.0 / 255.0, 28.0 / 255.0),
            platform_color: Color::rgb(0.6, 0.6, 0.6),
            disused_platform_color: Color::rgb(0.35, 0.35, 0.35),
            label_color: Color::rgb(0.85, 0.9, 1.0),
            markings_color: Color::rgba(1.0, 0.0, 1.0, 0.6),
            markings_text_color: Color::rgb(0.6, 0.8, 1.0),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::tube()
    }
}

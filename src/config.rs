use crate::surface::Color;
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stroke geometry shared by every track and platform segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentStyle {
    pub width: f64,
    pub radius: f64,
    pub min_length: f64,
    pub platform_distance: f64,
    pub platform_width: f64,
    pub back_width: f64,
    pub platform_back_width: f64,
    /// How far the main stroke runs past the end point to hide seams.
    pub overshoot: f64,
    pub dash: Vec<f64>,
}

impl Default for SegmentStyle {
    fn default() -> Self {
        Self {
            width: 3.0,
            radius: 7.0,
            min_length: crate::routing::DEFAULT_MIN_LENGTH,
            platform_distance: 3.5,
            platform_width: 2.0,
            back_width: 5.0,
            platform_back_width: 4.0,
            overshoot: 0.5,
            dash: vec![3.0, 2.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StationConfig {
    /// Spacing between parallel platforms of one station.
    pub station_gap: f64,
    pub label_size: f64,
    pub label_distance_x: f64,
    pub label_distance_y: f64,
    /// Extra leading between label lines.
    pub label_line_gap: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            station_gap: 10.0,
            label_size: 12.0,
            label_distance_x: 6.0,
            label_distance_y: 4.0,
            label_line_gap: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub padding: f64,
    pub scale: f64,
    /// Multiplier applied to coordinates read from map files.
    pub coordinate_scale: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            scale: 1.0,
            coordinate_scale: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub segment: SegmentStyle,
    pub station: StationConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    halo_color: Option<String>,
    platform_color: Option<String>,
    disused_platform_color: Option<String>,
    label_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    segment: Option<SegmentStyle>,
    station: Option<StationConfig>,
    render: Option<RenderConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents)
}

/// Parses a JSON config, accepting JSON5 (comments, trailing commas) when
/// strict JSON fails.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(strict_err) => json5::from_str(contents)
            .map_err(|_| strict_err)
            .context("invalid config file")?,
    };

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = match theme_name {
            "tube" | "default" => Theme::tube(),
            "night" => Theme::night(),
            other => anyhow::bail!("unknown theme {other:?}"),
        };
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.halo_color {
            config.theme.halo_color = Color::from_hex(&v)?;
        }
        if let Some(v) = vars.platform_color {
            config.theme.platform_color = Color::from_hex(&v)?;
        }
        if let Some(v) = vars.disused_platform_color {
            config.theme.disused_platform_color = Color::from_hex(&v)?;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = Color::from_hex(&v)?;
        }
    }

    if let Some(segment) = parsed.segment {
        config.segment = segment;
    }
    if let Some(station) = parsed.station {
        config.station = station;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }

    log::debug!("loaded config: {config:?}");
    Ok(config)
}

use crate::config::Config;
use crate::geometry::Vector2;
use crate::map::{DrawOptions, DrawReport, TubeMap};
use crate::surface::{Surface, SvgSurface};
use crate::text_metrics::{FontMetrics, MeasureText};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub svg: String,
    pub width: f64,
    pub height: f64,
    pub report: DrawReport,
}

/// Page size and the translation that brings the map's extents inside the
/// padding.
pub fn canvas(map: &TubeMap, config: &Config) -> (f64, f64, Vector2) {
    let (min, max) = map.extents();
    let padding = config.render.padding;
    let scale = config.render.scale;
    let width = (max.x - min.x + padding * 2.0) * scale;
    let height = (max.y - min.y + padding * 2.0) * scale;
    let origin = Vector2::new(padding - min.x, padding - min.y);
    (width, height, origin)
}

/// Draws `map` onto a fresh SVG page, measuring labels with the theme font.
pub fn render_map(map: &TubeMap, config: &Config, options: &DrawOptions) -> RenderOutput {
    let metrics = FontMetrics::new(&config.theme.font_family);
    render_map_with(map, config, options, &metrics)
}

pub fn render_map_with<M: MeasureText + ?Sized>(
    map: &TubeMap,
    config: &Config,
    options: &DrawOptions,
    metrics: &M,
) -> RenderOutput {
    let (width, height, origin) = canvas(map, config);
    let mut surface = SvgSurface::new(&config.theme.font_family);
    surface.scale(config.render.scale);
    surface.translate(origin);
    let report = map.draw(&mut surface, config, options, metrics);
    let svg = surface.finish(width, height, &config.theme.background);
    RenderOutput {
        svg,
        width,
        height,
        report,
    }
}

pub fn render_svg(map: &TubeMap, config: &Config, options: &DrawOptions) -> String {
    render_map(map, config, options).svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = config.theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    log::debug!("wrote {}x{} png to {}", size.width(), size.height(), output.display());
    Ok(())
}

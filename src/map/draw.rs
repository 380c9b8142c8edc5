use std::collections::HashSet;
use std::f64::consts::TAU;

use serde::Serialize;

use crate::config::Config;
use crate::geometry::Vector2;
use crate::routing::Path;
use crate::stroke::Segment;
use crate::surface::{Color, Surface};
use crate::text_metrics::MeasureText;

use super::{PlatformId, TubeMap, layout_label};

const MARKING_CROSS: f64 = 5.0;
const MARKING_DOT: f64 = 3.0;
const MARKING_TEXT_SIZE: f64 = 4.0;
const HIGHLIGHT_COLOR: Color = Color::rgba(1.0, 0.0, 0.0, 0.9);

#[derive(Debug, Clone, Default)]
pub struct DrawOptions {
    /// Overlay station crosses, platform dots and platform numbers.
    pub markings: bool,
    /// Station codes whose markings are drawn highlighted.
    pub highlighted: HashSet<String>,
}

/// A routed track, as drawn.
#[derive(Debug, Clone, Serialize)]
pub struct TrackRoute {
    pub from: String,
    pub to: String,
    pub line: String,
    pub subtrack: bool,
    pub path: Path,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawReport {
    pub routes: Vec<TrackRoute>,
    pub platforms_drawn: usize,
    pub labels_drawn: usize,
}

impl DrawReport {
    pub fn truncated_routes(&self) -> usize {
        self.routes.iter().filter(|route| route.path.is_truncated()).count()
    }
}

impl TubeMap {
    /// One full draw pass: tracks with the platforms at their ends, then
    /// every station's remaining platforms and its label, in draw order.
    /// Each platform is drawn at most once per pass.
    pub fn draw<S, M>(&self, surface: &mut S, config: &Config, options: &DrawOptions, metrics: &M) -> DrawReport
    where
        S: Surface + ?Sized,
        M: MeasureText + ?Sized,
    {
        let mut visited: HashSet<PlatformId> = HashSet::new();
        let mut report = DrawReport::default();

        for track in &self.tracks {
            for id in [track.from, track.to] {
                self.draw_platform(surface, config, id, &mut visited, &mut report);
            }
            let (Some(ends), Some(line)) = (self.track_ends(track), self.line(track.line)) else {
                log::warn!(
                    "skipping track {} -> {}: dangling reference",
                    self.platform_label(track.from),
                    self.platform_label(track.to)
                );
                continue;
            };
            let path = Segment::new(ends.start_point, ends.start_dir, ends.end_point, ends.end_dir)
                .with_colors(&line.colors)
                .subtrack(track.subtrack)
                .draw(surface, &config.segment, &config.theme);
            let route = TrackRoute {
                from: self.platform_label(track.from),
                to: self.platform_label(track.to),
                line: line.code.clone(),
                subtrack: track.subtrack,
                path,
            };
            report.routes.push(route);
        }

        for &station_id in &self.draw_order {
            let Some(station) = self.station(station_id) else {
                continue;
            };
            for platform in 0..station.platforms.len() {
                let id = PlatformId {
                    station: station_id,
                    platform,
                };
                self.draw_platform(surface, config, id, &mut visited, &mut report);
            }
            if let Some(label) = layout_label(
                station,
                self.station_offset(station_id),
                &config.segment,
                &config.station,
                metrics,
            ) {
                surface.set_color(config.theme.label_color);
                for line in &label.lines {
                    surface.show_text(line.position, &line.text, label.font_size);
                }
                report.labels_drawn += 1;
            }
        }

        if options.markings {
            self.draw_markings(surface, config, options);
        }

        log::debug!(
            "drew {} tracks, {} platforms, {} labels",
            report.routes.len(),
            report.platforms_drawn,
            report.labels_drawn
        );
        report
    }

    fn draw_platform<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        config: &Config,
        id: PlatformId,
        visited: &mut HashSet<PlatformId>,
        report: &mut DrawReport,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(platform) = self.platform(id) else {
            return;
        };
        let Some(line) = self.line(platform.line) else {
            return;
        };
        let origin = self.station_offset(id.station);
        if let Some(segment) = platform.segment(origin, line, &config.theme) {
            segment.draw(surface, &config.segment, &config.theme);
            report.platforms_drawn += 1;
        }
    }

    fn draw_markings<S: Surface + ?Sized>(&self, surface: &mut S, config: &Config, options: &DrawOptions) {
        let theme = &config.theme;
        for &station_id in &self.draw_order {
            let Some(station) = self.station(station_id) else {
                continue;
            };
            surface.save();
            surface.set_color(if options.highlighted.contains(&station.code) {
                HIGHLIGHT_COLOR
            } else {
                theme.markings_color
            });
            surface.translate(self.station_offset(station_id));

            let c = MARKING_CROSS;
            surface.move_to(Vector2::new(-c, -c));
            surface.line_to(Vector2::new(c, c));
            surface.move_to(Vector2::new(c, -c));
            surface.line_to(Vector2::new(-c, c));
            surface.set_line_width(2.0);
            surface.stroke();

            for platform in &station.platforms {
                surface.save();
                surface.translate(platform.offset);
                surface.arc(Vector2::ZERO, MARKING_DOT, 0.0, TAU, true);
                surface.fill();
                surface.restore();
            }

            surface.set_color(theme.markings_text_color);
            for platform in &station.platforms {
                surface.show_text(
                    platform.offset + Vector2::new(-1.0, 1.0),
                    &platform.number,
                    MARKING_TEXT_SIZE,
                );
            }
            surface.restore();
        }
    }
}

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod map;
pub mod parser;
pub mod render;
pub mod route_dump;
pub mod routing;
pub mod stroke;
pub mod surface;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{LoadError, ParseError};
pub use geometry::{Direction, Vector2};
pub use map::{DrawOptions, TubeMap};
pub use parser::{parse_map, save_offsets};
pub use render::{render_map, render_svg};
pub use routing::{Path, Router, route};
pub use stroke::{PlatformSide, Segment};
pub use surface::{Color, Surface};
pub use theme::Theme;

use crate::config::load_config;
use crate::map::DrawOptions;
use crate::parser::{load_map, write_offsets};
use crate::render::{render_map, write_output_svg};
use crate::route_dump::write_route_dump;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tubemap", version, about = "Renders tube-style line maps to SVG or PNG")]
pub struct Args {
    /// Map description file
    pub input: PathBuf,

    /// Output file (svg/png). Defaults to the input name with the format's extension.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and stroke geometry)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Overlay station and platform markings
    #[arg(short = 'm', long = "markings")]
    pub markings: bool,

    /// Station codes to highlight in the markings overlay
    #[arg(long = "highlight", value_delimiter = ',')]
    pub highlight: Vec<String>,

    /// Write stations, platforms and routed tracks as JSON
    #[arg(long = "dump-routes")]
    pub dump_routes: Option<PathBuf>,

    /// Rewrite the input's station coordinates in snapped form
    #[arg(long = "write-offsets")]
    pub write_offsets: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let map = load_map(&args.input, &config)?;

    let options = DrawOptions {
        markings: args.markings,
        highlighted: args.highlight.iter().cloned().collect::<HashSet<_>>(),
    };
    let output = render_map(&map, &config, &options);
    if output.report.truncated_routes() > 0 {
        log::warn!("{} track(s) could not be fully routed", output.report.truncated_routes());
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, args.output_format));
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&output.svg, Some(&target))?,
        OutputFormat::Png => write_png(&output.svg, &target, &config)?,
    }
    log::info!("wrote {}", target.display());

    if let Some(path) = &args.dump_routes {
        write_route_dump(path, &map, &output.report)?;
    }
    if args.write_offsets {
        write_offsets(&args.input, &map, config.render.coordinate_scale)?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, wins over the flag.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &crate::config::Config) -> Result<()> {
    crate::render::write_output_png(svg, output, config)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &crate::config::Config) -> Result<()> {
    anyhow::bail!("PNG output needs the `png` feature")
}

fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

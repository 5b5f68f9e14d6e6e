//! stitchgen: turn an image into a single-color stitch pattern.
//!
//! Reads an image file, runs the pattern engine with the given
//! parameters, prints per-stage diagnostics and writes any requested
//! outputs:
//!
//! - `--svg`: the pattern as an SVG document
//! - `--png`: the pattern rasterised to PNG
//! - `--chart` / `--chart-png`: a fabrication chart with gridlines
//!   (and, for SVG, ruler numbers)
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin stitchgen -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` for engine-level logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use stitchgen_export::{RasterOptions, SvgMetadata, chart};
use stitchgen_pipeline::{
    Dimensions, FillShape, GenerationConfig, Pattern, RenderTarget, ResampleFilter, Rgb,
    ThreadColor,
};

/// Convert an image into a single-color stitch silhouette pattern.
///
/// Dark, opaque regions of the image become stitches. The pattern can
/// be written as SVG, PNG, or a fabrication chart with gridlines.
#[derive(Parser)]
#[command(name = "stitchgen", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Number of stitch columns (the row count follows the aspect ratio).
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_GRID_WIDTH)]
    grid_width: u32,

    /// Luminance cutoff (0-255): darker samples become stitches.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Shape drawn for each stitch.
    #[arg(long, value_enum, default_value_t = Shape::SolidCircle)]
    shape: Shape,

    /// Shape size as a percentage of the cell (1-100).
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_SHAPE_SCALE_PERCENT)]
    scale: u8,

    /// Outline distance around the silhouette in output units (0 disables).
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_OUTLINE_INFLATION)]
    inflation: f64,

    /// Thread color: a `#RRGGBB` hex value or a DMC thread name/code
    /// (e.g. "310", "DMC 321", "Dark Delft Blue").
    #[arg(long, default_value = "#000000")]
    color: String,

    /// Resampling filter used to shrink the image to the grid.
    #[arg(long, value_enum, default_value_t = Filter::Area)]
    filter: Filter,

    /// Full generation config as a JSON string.
    ///
    /// When provided, all other generation flags are ignored. The JSON
    /// must be a valid `GenerationConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Output width in pixels / SVG units.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Output height in pixels / SVG units.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Fabric count for chart gridlines and physical size (e.g. "14-count").
    #[arg(long, default_value = "14-count")]
    fabric_count: String,

    /// Size output for printing at real fabric size at this many pixels
    /// per inch. Overrides `--width` and `--height`.
    #[arg(long)]
    dpi: Option<f64>,

    /// Write the pattern as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the pattern as PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Write a fabrication chart SVG with gridlines and ruler numbers.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Write a fabrication chart PNG with gridlines.
    #[arg(long)]
    chart_png: Option<PathBuf>,

    /// Leave the PNG background transparent instead of white.
    #[arg(long)]
    transparent: bool,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Stitch shape selection.
#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    /// Filled circle.
    SolidCircle,
    /// Circle outline.
    HollowCircle,
    /// Filled square.
    SolidSquare,
    /// Square outline.
    HollowSquare,
    /// Full cross ("X").
    CrossStitch,
    /// Half stitch, "/".
    HalfForward,
    /// Half stitch, "\".
    HalfBackward,
}

/// Resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    /// Mean of every covered source pixel.
    Area,
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic Catmull-Rom.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes (sharpest).
    Lanczos3,
}

/// Build a [`GenerationConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<GenerationConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let thread_color = stitchgen_pipeline::parse_thread_color(&cli.color)
        .map_err(|e| format!("--color: {e}"))?;

    Ok(GenerationConfig {
        grid_width: cli.grid_width,
        threshold: cli.threshold,
        fill_shape: match cli.shape {
            Shape::SolidCircle => FillShape::SolidCircle,
            Shape::HollowCircle => FillShape::HollowCircle,
            Shape::SolidSquare => FillShape::SolidSquare,
            Shape::HollowSquare => FillShape::HollowSquare,
            Shape::CrossStitch => FillShape::CrossStitch,
            Shape::HalfForward => FillShape::HalfForward,
            Shape::HalfBackward => FillShape::HalfBackward,
        },
        shape_scale_percent: cli.scale,
        outline_inflation: cli.inflation,
        thread_color,
        resample_filter: match cli.filter {
            Filter::Area => ResampleFilter::Area,
            Filter::Nearest => ResampleFilter::Nearest,
            Filter::Triangle => ResampleFilter::Triangle,
            Filter::CatmullRom => ResampleFilter::CatmullRom,
            Filter::Gaussian => ResampleFilter::Gaussian,
            Filter::Lanczos3 => ResampleFilter::Lanczos3,
        },
    })
}

/// Pick the output surface: physical size when `--dpi` is given,
/// otherwise the largest square-celled fit inside `--width x --height`.
fn render_target(
    cli: &Cli,
    grid: Dimensions,
    fabric_count: u32,
) -> Result<RenderTarget, stitchgen_pipeline::PipelineError> {
    match cli.dpi {
        Some(dpi) => stitchgen_pipeline::fit_physical(grid, fabric_count, dpi),
        None => stitchgen_pipeline::fit_to_target(grid, cli.width, cli.height),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = config_from_cli(cli)?;
    let fabric_count = stitchgen_pipeline::parse_fabric_count(&cli.fabric_count)
        .map_err(|e| format!("--fabric-count: {e}"))?;

    let image_bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("reading {}: {e}", cli.image_path.display()))?;

    eprintln!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!();

    let (pattern, diagnostics) =
        stitchgen_pipeline::generate_with_diagnostics(&image_bytes, &config)?;
    log::info!(
        "generated {}x{} pattern in {:?}",
        pattern.dimensions().width,
        pattern.dimensions().height,
        diagnostics.total_duration,
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        println!("{}", diagnostics.report());
    }

    let (inches_w, inches_h) =
        stitchgen_pipeline::physical_size_inches(pattern.dimensions(), fabric_count)?;
    eprintln!("Finished size on {fabric_count}-count fabric: {inches_w:.2} x {inches_h:.2} in");
    if let Some(thread) = ThreadColor::for_color(config.thread_color) {
        eprintln!("Thread: DMC {} ({})", thread.dmc, thread.name);
    }

    write_outputs(cli, &pattern, fabric_count, &format!("{inches_w:.2} x {inches_h:.2} in"))
}

fn write_outputs(
    cli: &Cli,
    pattern: &Pattern,
    fabric_count: u32,
    finished_size: &str,
) -> Result<(), Box<dyn Error>> {
    let target = render_target(cli, pattern.dimensions(), fabric_count)?;
    let title = cli
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("stitchgen");
    let description = format!(
        "{}x{} stitches, {}, {fabric_count}-count fabric, {finished_size}",
        pattern.dimensions().width,
        pattern.dimensions().height,
        pattern.config().fill_shape,
    );
    let config_json = serde_json::to_string(pattern.config())?;
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&description),
        config_json: Some(&config_json),
    };
    let background = (!cli.transparent).then_some(Rgb::new(255, 255, 255));

    if let Some(ref path) = cli.svg {
        let svg = stitchgen_export::to_svg(pattern, &target, &metadata);
        write_file(path, svg.as_bytes(), "SVG")?;
    }

    if let Some(ref path) = cli.png {
        let image = stitchgen_export::render_raster(
            pattern,
            &target,
            &RasterOptions {
                background,
                gridlines: None,
            },
        )?;
        write_file(path, &stitchgen_export::encode_png(&image)?, "PNG")?;
    }

    if cli.chart.is_none() && cli.chart_png.is_none() {
        return Ok(());
    }

    let lines = stitchgen_pipeline::gridlines(pattern.dimensions(), fabric_count)?;
    let chart_target = target.with_margin(chart::CHART_MARGIN);

    if let Some(ref path) = cli.chart {
        let svg = stitchgen_export::to_chart_svg(pattern, &chart_target, &lines, &metadata);
        write_file(path, svg.as_bytes(), "Chart SVG")?;
    }

    if let Some(ref path) = cli.chart_png {
        let image = stitchgen_export::render_raster(
            pattern,
            &chart_target,
            &RasterOptions {
                background,
                gridlines: Some(&lines),
            },
        )?;
        write_file(path, &stitchgen_export::encode_png(&image)?, "Chart PNG")?;
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8], what: &str) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, bytes)
        .map_err(|e| format!("writing {what} to {}: {e}", path.display()))?;
    eprintln!("{what} written to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

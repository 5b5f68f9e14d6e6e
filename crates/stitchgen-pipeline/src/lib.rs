//! stitchgen-pipeline: Pure stitch pattern engine (sans-IO).
//!
//! Converts a raster image into a single-color stitch silhouette:
//! quantize -> classify exterior -> (outline, shapes) per render target.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and byte slices and returns structured data. SVG and PNG
//! output lives in `stitchgen-export`; file handling in the `stitchgen`
//! CLI.

pub mod diagnostics;
pub mod exterior;
pub mod grid;
pub mod layout;
pub mod neighborhood;
pub mod outline;
pub mod palette;
pub mod pattern;
pub mod quantize;
pub mod shapes;
pub mod types;

use web_time::Instant;

pub use diagnostics::GenerationDiagnostics;
pub use exterior::{CellClass, classify_exterior};
pub use grid::{ExteriorMask, StitchGrid};
pub use layout::{
    Gridlines, RenderTarget, fit_physical, fit_to_target, gridlines, parse_fabric_count,
    physical_size_inches, stretch_to_target,
};
pub use neighborhood::{Corner, CornerKind, Direction, Neighborhood, Side};
pub use outline::{OutlinePath, OutlineStats, PathCommand, Sweep, build_outline};
pub use palette::{DMC_THREADS, ThreadColor, parse_thread_color};
pub use pattern::Pattern;
pub use quantize::{ResampleFilter, quantize};
pub use shapes::{Paint, ShapePrimitive, Shapes, render};
pub use types::{
    Dimensions, FillShape, GenerationConfig, PipelineError, Point, Rgb, RgbaImage,
};

use diagnostics::{GenerationSummary, StageDiagnostics, StageMetrics};

/// Generate a stitch pattern from a decoded image.
///
/// # Steps
///
/// 1. Validate the configuration
/// 2. Resample to `grid_width` columns and threshold into a stitch grid
/// 3. Flood-fill the exterior so enclosed holes are told apart
///
/// Outline and shapes are derived afterwards from the returned
/// [`Pattern`] for a chosen [`RenderTarget`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`GenerationConfig::validate`] or the image is so tall that the grid
/// would exceed [`GenerationConfig::MAX_GRID_HEIGHT`] rows, and
/// [`PipelineError::InvalidImage`] if the image has a zero dimension.
pub fn generate(image: &RgbaImage, config: &GenerationConfig) -> Result<Pattern, PipelineError> {
    config.validate()?;
    let grid = quantize::quantize_with_filter(
        image,
        config.grid_width,
        config.threshold,
        config.resample_filter,
    )?;
    let exterior = classify_exterior(&grid);
    Ok(Pattern::new(
        grid,
        exterior,
        config.clone(),
        image_dimensions(image),
    ))
}

/// Decode raw image bytes (PNG, JPEG, BMP, WebP) and [`generate`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty and
/// [`PipelineError::ImageDecode`] if the format is unrecognized, plus
/// every error of [`generate`].
pub fn generate_from_bytes(
    image_bytes: &[u8],
    config: &GenerationConfig,
) -> Result<Pattern, PipelineError> {
    config.validate()?;
    let image = quantize::decode(image_bytes)?;
    generate(&image, config)
}

/// [`generate_from_bytes`] with per-stage timing and counts.
///
/// # Errors
///
/// Same as [`generate_from_bytes`].
pub fn generate_with_diagnostics(
    image_bytes: &[u8],
    config: &GenerationConfig,
) -> Result<(Pattern, GenerationDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = Instant::now();

    let start = Instant::now();
    let image = quantize::decode(image_bytes)?;
    let source = image_dimensions(&image);
    let decode = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: source.width,
            height: source.height,
        },
    };

    let start = Instant::now();
    let grid = quantize::quantize_with_filter(
        &image,
        config.grid_width,
        config.threshold,
        config.resample_filter,
    )?;
    let quantize = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Quantize {
            filter: config.resample_filter.to_string(),
            threshold: config.threshold,
            grid_width: grid.width(),
            grid_height: grid.height(),
            occupied_count: grid.occupied_count(),
        },
    };

    let start = Instant::now();
    let exterior = classify_exterior(&grid);
    let holes = exterior::hole_count(&grid, &exterior);
    let classify = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Classify {
            exterior_count: exterior.exterior_count(),
            hole_count: holes,
        },
    };

    let pattern = Pattern::new(grid, exterior, config.clone(), source);

    let (outline, outline_fragments) = if config.outline_inflation > 0.0 {
        let start = Instant::now();
        let stats = pattern.outline_stats();
        let diag = StageDiagnostics {
            duration: start.elapsed(),
            metrics: StageMetrics::Outline {
                inflation: config.outline_inflation,
                straight: stats.straight,
                convex_arcs: stats.convex_arcs,
                concave_arcs: stats.concave_arcs,
            },
        };
        (Some(diag), stats.fragments())
    } else {
        (None, 0)
    };

    let summary = GenerationSummary {
        image_width: source.width,
        image_height: source.height,
        grid_width: pattern.grid().width(),
        grid_height: pattern.grid().height(),
        occupied_count: pattern.grid().occupied_count(),
        hole_count: holes,
        outline_fragments,
    };

    let diagnostics = GenerationDiagnostics {
        decode,
        quantize,
        classify,
        outline,
        total_duration: total_start.elapsed(),
        summary,
    };
    Ok((pattern, diagnostics))
}

fn image_dimensions(image: &RgbaImage) -> Dimensions {
    Dimensions {
        width: image.width(),
        height: image.height(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    /// A black ring (outer square minus inner square) on white.
    fn ring_image(size: u32, margin: u32, wall: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            let outer = (margin..size - margin).contains(&x) && (margin..size - margin).contains(&y);
            let inner_lo = margin + wall;
            let inner_hi = size - margin - wall;
            let inner = (inner_lo..inner_hi).contains(&x) && (inner_lo..inner_hi).contains(&y);
            if outer && !inner {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn generate_produces_requested_grid_size() {
        let image = RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 255]));
        for grid_width in [1, 7, 32, 150] {
            let config = GenerationConfig {
                grid_width,
                ..GenerationConfig::default()
            };
            let pattern = generate(&image, &config).unwrap();
            let expected = (grid_width * 200 / 300).max(1);
            assert_eq!(pattern.dimensions().width, grid_width);
            assert_eq!(pattern.dimensions().height, expected);
            assert_eq!(
                pattern.source_dimensions(),
                Dimensions {
                    width: 300,
                    height: 200
                }
            );
        }
    }

    #[test]
    fn generate_is_deterministic() {
        let image = ring_image(64, 8, 8);
        let config = GenerationConfig {
            grid_width: 16,
            outline_inflation: 1.5,
            ..GenerationConfig::default()
        };
        assert_eq!(
            generate(&image, &config).unwrap(),
            generate(&image, &config).unwrap()
        );
    }

    #[test]
    fn ring_has_a_hole() {
        // 64px image at 8 stitches: 8px per cell, a one-cell-thick ring
        // around a 4x4-cell hole.
        let image = ring_image(64, 8, 8);
        let config = GenerationConfig {
            grid_width: 8,
            ..GenerationConfig::default()
        };
        let pattern = generate(&image, &config).unwrap();
        assert_eq!(
            pattern.grid().to_ascii(),
            vec![
                "........",
                ".######.",
                ".#....#.",
                ".#....#.",
                ".#....#.",
                ".#....#.",
                ".######.",
                "........",
            ]
        );
        assert_eq!(pattern.hole_count(), 16);
    }

    #[test]
    fn invalid_config_is_rejected_before_decoding() {
        let config = GenerationConfig {
            grid_width: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            generate_from_bytes(&[], &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn very_tall_image_is_rejected() {
        let image = RgbaImage::from_pixel(1, 5000, Rgba([0, 0, 0, 255]));
        let config = GenerationConfig {
            grid_width: 1,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            generate(&image, &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(
            generate_from_bytes(&[], &GenerationConfig::default()),
            Err(PipelineError::EmptyInput)
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            generate_from_bytes(b"not an image", &GenerationConfig::default()),
            Err(PipelineError::ImageDecode(_))
        ));
    }

    #[test]
    fn fully_transparent_image_has_no_stitches() {
        let image = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 0]));
        let pattern = generate(&image, &GenerationConfig::default()).unwrap();
        assert_eq!(pattern.grid().occupied_count(), 0);
        assert_eq!(pattern.outline_stats(), OutlineStats::default());
    }

    #[test]
    fn bytes_and_image_paths_agree() {
        let image = ring_image(48, 4, 10);
        let config = GenerationConfig {
            grid_width: 12,
            ..GenerationConfig::default()
        };
        let from_image = generate(&image, &config).unwrap();
        let from_bytes = generate_from_bytes(&encode_png(&image), &config).unwrap();
        assert_eq!(from_image, from_bytes);
    }

    #[test]
    fn diagnostics_match_the_pattern() {
        let image = ring_image(64, 8, 8);
        let config = GenerationConfig {
            grid_width: 8,
            outline_inflation: 2.0,
            ..GenerationConfig::default()
        };
        let (pattern, diag) = generate_with_diagnostics(&encode_png(&image), &config).unwrap();
        assert_eq!(diag.summary.image_width, 64);
        assert_eq!(diag.summary.grid_width, 8);
        assert_eq!(diag.summary.grid_height, 8);
        assert_eq!(diag.summary.occupied_count, 20);
        assert_eq!(diag.summary.hole_count, 16);
        assert_eq!(
            diag.summary.outline_fragments,
            pattern.outline_stats().fragments()
        );
        // Outer square only: 6 stitches per side, 4 rounded corners.
        let stats = pattern.outline_stats();
        assert_eq!(stats.straight, 24);
        assert_eq!(stats.convex_arcs, 4);
        assert_eq!(stats.concave_arcs, 0);
        assert!(diag.outline.is_some());
        assert!(diag.total_duration >= diag.quantize.duration);
    }

    #[test]
    fn diagnostics_skip_outline_when_disabled() {
        let image = ring_image(32, 4, 4);
        let (_, diag) =
            generate_with_diagnostics(&encode_png(&image), &GenerationConfig::default()).unwrap();
        assert!(diag.outline.is_none());
        assert_eq!(diag.summary.outline_fragments, 0);
    }
}

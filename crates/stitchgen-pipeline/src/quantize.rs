//! Grid quantization: image in, boolean stitch grid out.
//!
//! The source image is resampled to exactly one sample per stitch cell,
//! then each sample is classified by opacity and luminance. This is the
//! first processing step after decode; every later stage works on the
//! resulting [`StitchGrid`].

use std::fmt;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::grid::StitchGrid;
use crate::types::{Dimensions, GenerationConfig, PipelineError};

/// Samples with alpha at or below this value are never stitched.
pub const ALPHA_CUTOFF: u8 = 128;

/// Resampling filter used when shrinking the image to grid resolution.
///
/// [`Area`](Self::Area) averages every source pixel covered by a cell so
/// thin detail contributes proportionally instead of aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Box filter: mean of the covered source area.
    #[default]
    Area,
    /// Nearest-neighbor: fastest, blocky and aliased.
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    ///
    /// Returns `None` for [`ResampleFilter::Area`], which is implemented
    /// by `image::imageops::thumbnail` rather than a convolution filter.
    const fn to_image_filter(self) -> Option<image::imageops::FilterType> {
        match self {
            Self::Area => None,
            Self::Nearest => Some(image::imageops::FilterType::Nearest),
            Self::Triangle => Some(image::imageops::FilterType::Triangle),
            Self::CatmullRom => Some(image::imageops::FilterType::CatmullRom),
            Self::Gaussian => Some(image::imageops::FilterType::Gaussian),
            Self::Lanczos3 => Some(image::imageops::FilterType::Lanczos3),
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area => f.write_str("Area"),
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Decode raw image bytes (PNG, JPEG, BMP, WebP) into RGBA.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Number of stitch rows for an image of `source` size rendered
/// `grid_width` stitches wide.
///
/// Equal to `max(1, floor(grid_width / (source.width / source.height)))`,
/// evaluated exactly in integer arithmetic.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidImage`] if `source` has no area and
/// [`PipelineError::InvalidConfig`] if `grid_width` is zero or the row
/// count would exceed [`GenerationConfig::MAX_GRID_HEIGHT`].
pub fn grid_height(source: Dimensions, grid_width: u32) -> Result<u32, PipelineError> {
    check_inputs(source, grid_width)?;
    let rows = u64::from(grid_width) * u64::from(source.height) / u64::from(source.width);
    if rows > u64::from(GenerationConfig::MAX_GRID_HEIGHT) {
        return Err(PipelineError::InvalidConfig(format!(
            "a {}x{} image at grid_width {grid_width} needs {rows} rows, at most {} allowed",
            source.width,
            source.height,
            GenerationConfig::MAX_GRID_HEIGHT,
        )));
    }
    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_GRID_HEIGHT
    let rows = rows as u32;
    Ok(rows.max(1))
}

/// Quantize `image` into a `grid_width`-wide stitch grid using area
/// averaging.
///
/// A cell is stitched iff its resampled alpha exceeds [`ALPHA_CUTOFF`]
/// and its luminance `0.299R + 0.587G + 0.114B` is strictly below
/// `threshold`. Transparency wins over luminance.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidImage`] for a zero-area image and
/// [`PipelineError::InvalidConfig`] for a zero grid width.
pub fn quantize(
    image: &RgbaImage,
    grid_width: u32,
    threshold: u8,
) -> Result<StitchGrid, PipelineError> {
    quantize_with_filter(image, grid_width, threshold, ResampleFilter::Area)
}

/// [`quantize`] with an explicit resampling filter.
///
/// # Errors
///
/// Same as [`quantize`].
pub fn quantize_with_filter(
    image: &RgbaImage,
    grid_width: u32,
    threshold: u8,
    filter: ResampleFilter,
) -> Result<StitchGrid, PipelineError> {
    let source = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    let rows = grid_height(source, grid_width)?;

    let samples = resample(image, grid_width, rows, filter);
    let grid = StitchGrid::from_fn(grid_width, rows, |x, y| {
        is_stitch(*samples.get_pixel(x, y), threshold)
    })?;

    log::debug!(
        "quantized {}x{} image to {}x{} grid ({filter}, threshold {threshold}): {} stitches",
        source.width,
        source.height,
        grid.width(),
        grid.height(),
        grid.occupied_count(),
    );
    Ok(grid)
}

/// Resample to exactly `width x height` samples.
fn resample(image: &RgbaImage, width: u32, height: u32, filter: ResampleFilter) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    filter.to_image_filter().map_or_else(
        || image::imageops::thumbnail(image, width, height),
        |f| image::imageops::resize(image, width, height, f),
    )
}

/// Luminance of a pixel on the 0-255 scale (ITU-R BT.601 weights).
#[must_use]
pub fn luminance(pixel: Rgba<u8>) -> f64 {
    let [r, g, b, _] = pixel.0;
    0.299f64.mul_add(
        f64::from(r),
        0.587f64.mul_add(f64::from(g), 0.114 * f64::from(b)),
    )
}

/// Whether a resampled pixel becomes a stitch.
///
/// The luminance comparison is done on integer-scaled weights
/// (`299R + 587G + 114B < 1000 * threshold`), which is the exact form of
/// `luminance(pixel) < threshold`.
#[must_use]
pub fn is_stitch(pixel: Rgba<u8>, threshold: u8) -> bool {
    let [r, g, b, a] = pixel.0;
    if a <= ALPHA_CUTOFF {
        return false;
    }
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    weighted < 1000 * u32::from(threshold)
}

fn check_inputs(source: Dimensions, grid_width: u32) -> Result<(), PipelineError> {
    if source.width == 0 || source.height == 0 {
        return Err(PipelineError::InvalidImage {
            width: source.width,
            height: source.height,
        });
    }
    if grid_width < 1 {
        return Err(PipelineError::InvalidConfig(
            "grid_width must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

//! Shared types for the stitchgen pattern pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::quantize::ResampleFilter;

/// Re-export `RgbaImage` so downstream crates can hand decoded images to
/// the pipeline (and receive rendered rasters) without depending on
/// `image` directly.
pub use image::RgbaImage;

/// A 2D point in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (units from left edge).
    pub x: f64,
    /// Vertical position (units from top edge, y grows downward).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Image or grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels (or stitches).
    pub width: u32,
    /// Height in pixels (or stitches).
    pub height: u32,
}

/// An opaque 8-bit sRGB color.
///
/// Serialized as a `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black, the default thread color.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` or `RRGGBB` hex string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the string is not six
    /// hexadecimal digits with an optional leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, PipelineError> {
        let digits = hex.trim().strip_prefix('#').unwrap_or_else(|| hex.trim());
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PipelineError::InvalidConfig(format!(
                "color must be #RRGGBB, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| PipelineError::InvalidConfig(format!("invalid color '{hex}': {e}")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as an uppercase `#RRGGBB` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Shape drawn for every occupied stitch cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillShape {
    /// Filled circle.
    #[default]
    SolidCircle,
    /// Stroked circle.
    HollowCircle,
    /// Filled square.
    SolidSquare,
    /// Stroked square.
    HollowSquare,
    /// Both diagonals of the inset square (an "X").
    CrossStitch,
    /// Bottom-left to top-right diagonal ("/").
    HalfForward,
    /// Top-left to bottom-right diagonal ("\").
    HalfBackward,
}

impl FillShape {
    /// All shapes, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SolidCircle,
        Self::HollowCircle,
        Self::SolidSquare,
        Self::HollowSquare,
        Self::CrossStitch,
        Self::HalfForward,
        Self::HalfBackward,
    ];

    /// Whether this shape is drawn as diagonal thread lines rather than
    /// a round or square envelope.
    #[must_use]
    pub const fn is_line_stitch(self) -> bool {
        matches!(
            self,
            Self::CrossStitch | Self::HalfForward | Self::HalfBackward
        )
    }
}

impl fmt::Display for FillShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolidCircle => f.write_str("SolidCircle"),
            Self::HollowCircle => f.write_str("HollowCircle"),
            Self::SolidSquare => f.write_str("SolidSquare"),
            Self::HollowSquare => f.write_str("HollowSquare"),
            Self::CrossStitch => f.write_str("CrossStitch"),
            Self::HalfForward => f.write_str("HalfForward"),
            Self::HalfBackward => f.write_str("HalfBackward"),
        }
    }
}

/// Configuration for one pattern generation call.
///
/// The engine never reads ambient state: everything that influences the
/// output arrives through this struct (and the render target).
///
/// Call [`validate`](Self::validate) before use; [`crate::generate`]
/// does so automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of stitch columns. The row count follows from the image
    /// aspect ratio.
    pub grid_width: u32,

    /// Luminance cutoff. A sample is stitched when its luminance is
    /// strictly below this value (and it is mostly opaque).
    pub threshold: u8,

    /// Shape drawn for each occupied cell.
    pub fill_shape: FillShape,

    /// Shape size as a percentage in `1..=100`. 50 is the nominal size.
    pub shape_scale_percent: u8,

    /// Outward offset of the silhouette outline in output units.
    /// `0.0` disables the outline.
    pub outline_inflation: f64,

    /// Thread color used for every shape and the outline.
    pub thread_color: Rgb,

    /// Resampling filter used to shrink the image to grid resolution.
    pub resample_filter: ResampleFilter,
}

impl GenerationConfig {
    /// Default number of stitch columns.
    pub const DEFAULT_GRID_WIDTH: u32 = 32;
    /// Default luminance threshold.
    pub const DEFAULT_THRESHOLD: u8 = 128;
    /// Default shape scale percentage.
    pub const DEFAULT_SHAPE_SCALE_PERCENT: u8 = 50;
    /// Default outline inflation (outline disabled).
    pub const DEFAULT_OUTLINE_INFLATION: f64 = 0.0;
    /// Largest grid width accepted by [`validate`](Self::validate).
    ///
    /// Bounds the worst-case flood-fill and contour work.
    pub const MAX_GRID_WIDTH: u32 = 1000;
    /// Largest number of stitch rows a source image may produce.
    ///
    /// The row count follows the image aspect ratio, so a tall, narrow
    /// image is rejected here rather than allocating an unbounded grid.
    pub const MAX_GRID_HEIGHT: u32 = 1000;

    /// Check every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first field
    /// that is out of range.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.grid_width < 1 {
            return Err(PipelineError::InvalidConfig(
                "grid_width must be at least 1".to_owned(),
            ));
        }
        if self.grid_width > Self::MAX_GRID_WIDTH {
            return Err(PipelineError::InvalidConfig(format!(
                "grid_width must be at most {}, got {}",
                Self::MAX_GRID_WIDTH,
                self.grid_width
            )));
        }
        if !(1..=100).contains(&self.shape_scale_percent) {
            return Err(PipelineError::InvalidConfig(format!(
                "shape_scale_percent must be in 1..=100, got {}",
                self.shape_scale_percent
            )));
        }
        if !self.outline_inflation.is_finite() || self.outline_inflation < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "outline_inflation must be finite and non-negative, got {}",
                self.outline_inflation
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            grid_width: Self::DEFAULT_GRID_WIDTH,
            threshold: Self::DEFAULT_THRESHOLD,
            fill_shape: FillShape::default(),
            shape_scale_percent: Self::DEFAULT_SHAPE_SCALE_PERCENT,
            outline_inflation: Self::DEFAULT_OUTLINE_INFLATION,
            thread_color: Rgb::BLACK,
            resample_filter: ResampleFilter::default(),
        }
    }
}

/// Errors reported by the pipeline.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The source image has zero width or height.
    #[error("invalid image: {width}x{height} has no area")]
    InvalidImage {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },

    /// Generation or layout configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested output target cannot hold a rendering.
    #[error("invalid render target: {0}")]
    InvalidTarget(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
}

/// Serde-compatible proxy for `PipelineError`.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    InvalidImage { width: u32, height: u32 },
    InvalidConfig(String),
    InvalidTarget(String),
    EmptyInput,
    ImageDecode(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::InvalidImage { width, height } => PipelineErrorProxy::InvalidImage {
                width: *width,
                height: *height,
            },
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
            Self::InvalidTarget(s) => PipelineErrorProxy::InvalidTarget(s.clone()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::InvalidImage { width, height } => {
                Self::InvalidImage { width, height }
            }
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            PipelineErrorProxy::InvalidTarget(s) => Self::InvalidTarget(s),
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            // The typed image error cannot be rebuilt; keep the message.
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
        })
    }
}

//! Shared styling for fabrication charts (gridlines and rulers).
//!
//! The SVG chart and the raster gridline overlay draw from the same
//! values so a printed PNG matches the SVG chart.

use stitchgen_pipeline::Rgb;

/// Light gray line at every stitch boundary.
pub const MINOR_LINE_COLOR: Rgb = Rgb::new(220, 220, 220);
/// Width of minor gridlines in output units.
pub const MINOR_LINE_WIDTH: f64 = 0.5;

/// Darker gray line at every multiple of the fabric count.
pub const MAJOR_LINE_COLOR: Rgb = Rgb::new(150, 150, 150);
/// Width of major gridlines in output units.
pub const MAJOR_LINE_WIDTH: f64 = 1.0;

/// Ruler number color.
pub const LABEL_COLOR: Rgb = Rgb::new(100, 100, 100);
/// Ruler number font size in output units.
pub const LABEL_FONT_SIZE: f64 = 8.0;
/// Gap between the grid edge and a ruler number.
pub const LABEL_GAP: f64 = 5.0;

/// Margin to reserve around a chart for the ruler numbers.
pub const CHART_MARGIN: f64 = 30.0;

//! stitchgen-export: Pure pattern serializers (sans-IO)
//!
//! Converts a generated [`Pattern`](stitchgen_pipeline::Pattern) into
//! output formats: SVG (plain or as a fabrication chart) and raster
//! images rendered with `tiny-skia`, encodable as PNG.

pub mod chart;
pub mod raster;
pub mod svg;

pub use raster::{ExportError, RasterOptions, encode_png, render_raster};
pub use svg::{SvgMetadata, build_outline_data, to_chart_svg, to_svg};

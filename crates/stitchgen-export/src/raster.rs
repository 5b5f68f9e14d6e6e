//! Raster export via `tiny-skia`.
//!
//! Draws the same outline and shape primitives as the SVG serializer
//! into an anti-aliased pixmap, then converts it to a straight-alpha
//! `image::RgbaImage`. Outline arcs are approximated by cubic Béziers.
//!
//! Gridlines can be overlaid for printing; ruler numbers are SVG-only
//! because `tiny-skia` has no text rendering.

use std::f64::consts::FRAC_PI_2;

use image::{Rgba, RgbaImage};
use stitchgen_pipeline::outline::arc_angles;
use stitchgen_pipeline::{
    Gridlines, OutlinePath, Paint, PathCommand, Pattern, Point, RenderTarget, Rgb, ShapePrimitive,
};
use tiny_skia::{FillRule, LineCap, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::chart;

/// Errors from raster rendering and encoding.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    PngEncode(#[from] image::ImageError),

    /// The requested raster size cannot be allocated.
    #[error("invalid raster size: {0}")]
    InvalidRaster(String),
}

/// Optional extras for [`render_raster`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterOptions<'a> {
    /// Opaque background. `None` leaves the background transparent.
    pub background: Option<Rgb>,
    /// Gridline overlay, drawn on top of the pattern.
    pub gridlines: Option<&'a Gridlines>,
}

/// Render a pattern into a `ceil(target.width()) x ceil(target.height())`
/// RGBA image.
///
/// # Errors
///
/// Returns [`ExportError::InvalidRaster`] if the target is too large for
/// a `u32` pixel count or the pixmap cannot be allocated.
pub fn render_raster(
    pattern: &Pattern,
    target: &RenderTarget,
    options: &RasterOptions<'_>,
) -> Result<RgbaImage, ExportError> {
    let (width, height) = raster_size(target)?;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ExportError::InvalidRaster(format!("cannot allocate a {width}x{height} pixmap"))
    })?;

    if let Some(bg) = options.background {
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
    }

    let outline = pattern.outline(target);
    draw_outline(&mut pixmap, &outline);

    let mut drawn = 0usize;
    for primitive in pattern.shapes(target) {
        draw_primitive(&mut pixmap, &primitive);
        drawn += 1;
    }

    if let Some(gridlines) = options.gridlines {
        draw_gridlines(&mut pixmap, target, gridlines);
    }

    log::debug!(
        "rasterized {width}x{height}: {drawn} primitives, {} outline fragments",
        outline.stats().fragments(),
    );
    Ok(pixmap_to_rgba(&pixmap))
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn raster_size(target: &RenderTarget) -> Result<(u32, u32), ExportError> {
    let to_pixels = |v: f64| {
        let v = v.ceil();
        (v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
    };
    match (to_pixels(target.width()), to_pixels(target.height())) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ExportError::InvalidRaster(format!(
            "target {}x{} is not a positive pixel size",
            target.width(),
            target.height()
        ))),
    }
}

fn paint_for(color: Rgb) -> tiny_skia::Paint<'static> {
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::cast_possible_truncation)]
fn stroke(width: f64, line_cap: LineCap) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap,
        ..Stroke::default()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn draw_outline(pixmap: &mut Pixmap, outline: &OutlinePath) {
    let mut pb = PathBuilder::new();
    let mut current = Point::new(0.0, 0.0);
    for command in outline.commands() {
        match *command {
            PathCommand::MoveTo(p) => {
                pb.move_to(p.x as f32, p.y as f32);
                current = p;
            }
            PathCommand::LineTo(p) => {
                pb.line_to(p.x as f32, p.y as f32);
                current = p;
            }
            PathCommand::ArcTo {
                center,
                radius,
                sweep,
                to,
            } => {
                let (start, delta) = arc_angles(current, center, to, sweep);
                append_arc(&mut pb, center, radius, start, delta);
                current = to;
            }
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(outline.color()),
        &stroke(outline.stroke_width(), LineCap::Butt),
        Transform::identity(),
        None,
    );
}

/// Append a circular arc as cubic Béziers of at most a quarter turn each.
///
/// Each piece uses control points at `4/3 * tan(theta / 4)` of the radius
/// along the end tangents. The current point must already be the arc
/// start.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn append_arc(pb: &mut PathBuilder, center: Point, radius: f64, start: f64, delta: f64) {
    let pieces = (delta.abs() / FRAC_PI_2).ceil().max(1.0) as u32;
    let step = delta / f64::from(pieces);
    let h = 4.0 / 3.0 * (step / 4.0).tan() * radius;
    let at = |a: f64| {
        Point::new(
            radius.mul_add(a.cos(), center.x),
            radius.mul_add(a.sin(), center.y),
        )
    };

    for i in 0..pieces {
        let a0 = f64::from(i).mul_add(step, start);
        let a1 = a0 + step;
        let (p0, p3) = (at(a0), at(a1));
        let c1 = Point::new(h.mul_add(-a0.sin(), p0.x), h.mul_add(a0.cos(), p0.y));
        let c2 = Point::new(h.mul_add(a1.sin(), p3.x), h.mul_add(-a1.cos(), p3.y));
        pb.cubic_to(
            c1.x as f32,
            c1.y as f32,
            c2.x as f32,
            c2.y as f32,
            p3.x as f32,
            p3.y as f32,
        );
    }
}

#[allow(clippy::cast_possible_truncation)]
fn draw_primitive(pixmap: &mut Pixmap, primitive: &ShapePrimitive) {
    match *primitive {
        ShapePrimitive::Circle {
            center,
            radius,
            paint,
            color,
        } => {
            if let Some(path) =
                PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
            {
                fill_or_stroke(pixmap, &path, paint, color);
            }
        }
        ShapePrimitive::Rect {
            origin,
            width,
            height,
            paint,
            color,
        } => {
            if let Some(rect) = Rect::from_xywh(
                origin.x as f32,
                origin.y as f32,
                width as f32,
                height as f32,
            ) {
                fill_or_stroke(pixmap, &PathBuilder::from_rect(rect), paint, color);
            }
        }
        ShapePrimitive::Line {
            from,
            to,
            width,
            color,
        } => stroke_line(pixmap, from, to, width, color, LineCap::Round),
    }
}

fn fill_or_stroke(pixmap: &mut Pixmap, path: &tiny_skia::Path, paint: Paint, color: Rgb) {
    match paint {
        Paint::Fill => pixmap.fill_path(
            path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        ),
        Paint::Stroke { width } => pixmap.stroke_path(
            path,
            &paint_for(color),
            &stroke(width, LineCap::Butt),
            Transform::identity(),
            None,
        ),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn stroke_line(pixmap: &mut Pixmap, from: Point, to: Point, width: f64, color: Rgb, cap: LineCap) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x as f32, from.y as f32);
    pb.line_to(to.x as f32, to.y as f32);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(
            &path,
            &paint_for(color),
            &stroke(width, cap),
            Transform::identity(),
            None,
        );
    }
}

fn draw_gridlines(pixmap: &mut Pixmap, target: &RenderTarget, gridlines: &Gridlines) {
    let top = target.offset_y();
    let bottom = top + target.content_height();
    let left = target.offset_x();
    let right = left + target.content_width();

    let mut draw = |columns: &[u32], rows: &[u32], color: Rgb, width: f64| {
        for &i in columns {
            let x = target.column_x(i);
            stroke_line(
                pixmap,
                Point::new(x, top),
                Point::new(x, bottom),
                width,
                color,
                LineCap::Butt,
            );
        }
        for &i in rows {
            let y = target.row_y(i);
            stroke_line(
                pixmap,
                Point::new(left, y),
                Point::new(right, y),
                width,
                color,
                LineCap::Butt,
            );
        }
    };
    draw(
        &gridlines.minor_columns,
        &gridlines.minor_rows,
        chart::MINOR_LINE_COLOR,
        chart::MINOR_LINE_WIDTH,
    );
    draw(
        &gridlines.major_columns,
        &gridlines.major_rows,
        chart::MAJOR_LINE_COLOR,
        chart::MAJOR_LINE_WIDTH,
    );
}

/// Convert a pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
#[allow(clippy::cast_possible_truncation)]
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap.data();
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, src) in img.pixels_mut().zip(data.chunks_exact(4)) {
        let a = src[3];
        *pixel = if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            // Un-premultiply: channel = premultiplied * 255 / alpha.
            let channel = |c: u8| (u16::from(c) * 255 / u16::from(a)) as u8;
            Rgba([channel(src[0]), channel(src[1]), channel(src[2]), a])
        };
    }
    img
}

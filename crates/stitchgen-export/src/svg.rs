//! SVG export serializer.
//!
//! Converts a [`Pattern`] into an SVG string using the [`svg`] crate for
//! document construction, XML escaping, and path data formatting.
//!
//! The outline becomes a single stroked `<path>` whose fragments use `M`,
//! `L` and `A` (elliptical arc) commands. Every stitch becomes one
//! `<circle>`, `<rect>` or `<line>` element (two `<line>`s for a cross
//! stitch).
//!
//! [`to_chart_svg`] adds the fabrication overlay: light minor gridlines,
//! darker major gridlines and ruler numbers on all four sides.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Line, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use stitchgen_pipeline::{
    Gridlines, OutlinePath, Paint, PathCommand, Pattern, RenderTarget, Rgb, ShapePrimitive, Sweep,
};

use crate::chart;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized generation configuration, emitted inside a
    /// `<metadata>` element wrapped in a namespaced `<stitchgen:config>`
    /// element so exported files carry machine-readable settings.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from an outline.
///
/// Returns an empty string for an empty outline.
///
/// # Examples
///
/// ```
/// use stitchgen_export::build_outline_data;
/// use stitchgen_pipeline::{Rgb, StitchGrid, build_outline, classify_exterior, stretch_to_target};
///
/// let grid = StitchGrid::from_ascii(&["#"]).unwrap();
/// let target = stretch_to_target(grid.dimensions(), 10.0, 10.0).unwrap();
/// let outline = build_outline(&grid, &classify_exterior(&grid), 2.0, Rgb::BLACK, &target);
/// let d = build_outline_data(&outline);
/// assert!(d.starts_with("M0,-2 L10,-2"));
/// ```
#[must_use]
pub fn build_outline_data(outline: &OutlinePath) -> String {
    if outline.is_empty() {
        return String::new();
    }
    let data = outline
        .commands()
        .iter()
        .fold(Data::new(), |data, command| match *command {
            PathCommand::MoveTo(p) => data.move_to((p.x, p.y)),
            PathCommand::LineTo(p) => data.line_to((p.x, p.y)),
            PathCommand::ArcTo {
                radius, sweep, to, ..
            } => {
                let sweep_flag = match sweep {
                    Sweep::Clockwise => 1,
                    Sweep::CounterClockwise => 0,
                };
                data.elliptical_arc_to((radius, radius, 0, 0, sweep_flag, to.x, to.y))
            }
        });
    String::from(Value::from(data))
}

/// Serialize a pattern into an SVG document string.
///
/// The document is `target.width() x target.height()` with a matching
/// `viewBox`, so every coordinate in the output is a target coordinate.
/// The outline (if any) is drawn first, followed by one element per
/// shape primitive in row-major stitch order.
///
/// # Examples
///
/// ```
/// use stitchgen_export::{SvgMetadata, to_svg};
/// use stitchgen_pipeline::{GenerationConfig, RgbaImage, fit_to_target, generate};
///
/// let image = RgbaImage::from_pixel(20, 10, image::Rgba([0, 0, 0, 255]));
/// let config = GenerationConfig { grid_width: 4, ..GenerationConfig::default() };
/// let pattern = generate(&image, &config).unwrap();
/// let target = fit_to_target(pattern.dimensions(), 400.0, 200.0).unwrap();
/// let metadata = SvgMetadata {
///     title: Some("block"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&pattern, &target, &metadata);
/// assert!(svg.contains("<title>block</title>"));
/// assert_eq!(svg.matches("<circle").count(), 8);
/// ```
#[must_use]
pub fn to_svg(pattern: &Pattern, target: &RenderTarget, metadata: &SvgMetadata<'_>) -> String {
    let doc = add_pattern(document(target, metadata), pattern, target);
    finish(&doc)
}

/// Serialize a pattern with a fabrication grid overlay.
///
/// Draws the pattern as [`to_svg`] does, then a light gray line at every
/// stitch boundary, a darker line at every major index of `gridlines`,
/// and the major indices as ruler numbers outside all four grid edges.
/// Give the target a margin (see [`RenderTarget::with_margin`] and
/// [`chart::CHART_MARGIN`]) so the numbers are inside the document.
#[must_use]
pub fn to_chart_svg(
    pattern: &Pattern,
    target: &RenderTarget,
    gridlines: &Gridlines,
    metadata: &SvgMetadata<'_>,
) -> String {
    let mut doc = add_pattern(document(target, metadata), pattern, target);

    let top = target.offset_y();
    let bottom = top + target.content_height();
    let left = target.offset_x();
    let right = left + target.content_width();

    let grid_group = |columns: &[u32], rows: &[u32], color: Rgb, width: f64| {
        let mut group = Group::new()
            .set("stroke", color.to_hex())
            .set("stroke-width", width);
        for &i in columns {
            let x = target.column_x(i);
            group = group.add(line_element(x, top, x, bottom));
        }
        for &i in rows {
            let y = target.row_y(i);
            group = group.add(line_element(left, y, right, y));
        }
        group
    };
    doc = doc.add(
        grid_group(
            &gridlines.minor_columns,
            &gridlines.minor_rows,
            chart::MINOR_LINE_COLOR,
            chart::MINOR_LINE_WIDTH,
        )
        .set("id", "minor-gridlines"),
    );
    doc = doc.add(
        grid_group(
            &gridlines.major_columns,
            &gridlines.major_rows,
            chart::MAJOR_LINE_COLOR,
            chart::MAJOR_LINE_WIDTH,
        )
        .set("id", "major-gridlines"),
    );

    let mut labels = Group::new()
        .set("id", "rulers")
        .set("fill", chart::LABEL_COLOR.to_hex())
        .set("font-family", "sans-serif")
        .set("font-size", chart::LABEL_FONT_SIZE);
    for &i in &gridlines.labeled_columns {
        let x = target.column_x(i);
        labels = labels.add(label(i, x, top - chart::LABEL_GAP, "middle", "auto"));
        labels = labels.add(label(i, x, bottom + chart::LABEL_GAP, "middle", "hanging"));
    }
    for &i in &gridlines.labeled_rows {
        let y = target.row_y(i);
        labels = labels.add(label(i, left - chart::LABEL_GAP, y, "end", "middle"));
        labels = labels.add(label(i, right + chart::LABEL_GAP, y, "start", "middle"));
    }
    doc = doc.add(labels);

    finish(&doc)
}

/// Empty document sized to `target`, with optional metadata elements.
fn document(target: &RenderTarget, metadata: &SvgMetadata<'_>) -> Document {
    let mut doc = Document::new()
        .set("width", target.width())
        .set("height", target.height())
        .set("viewBox", (0.0, 0.0, target.width(), target.height()));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("stitchgen:config");
        config_el.assign("xmlns:stitchgen", "urn:stitchgen:config:1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }
    doc
}

/// Append the outline and every shape primitive.
fn add_pattern(mut doc: Document, pattern: &Pattern, target: &RenderTarget) -> Document {
    let outline = pattern.outline(target);
    let d = build_outline_data(&outline);
    if !d.is_empty() {
        doc = doc.add(
            Path::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", outline.color().to_hex())
                .set("stroke-width", outline.stroke_width()),
        );
    }

    for primitive in pattern.shapes(target) {
        doc = match primitive {
            ShapePrimitive::Circle {
                center,
                radius,
                paint,
                color,
            } => doc.add(painted(
                Circle::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("r", radius),
                paint,
                color,
            )),
            ShapePrimitive::Rect {
                origin,
                width,
                height,
                paint,
                color,
            } => doc.add(painted(
                Rectangle::new()
                    .set("x", origin.x)
                    .set("y", origin.y)
                    .set("width", width)
                    .set("height", height),
                paint,
                color,
            )),
            ShapePrimitive::Line {
                from,
                to,
                width,
                color,
            } => doc.add(
                line_element(from.x, from.y, to.x, to.y)
                    .set("stroke", color.to_hex())
                    .set("stroke-width", width)
                    .set("stroke-linecap", "round"),
            ),
        };
    }
    doc
}

/// Apply fill or stroke attributes to a closed shape.
fn painted<T: Node>(mut element: T, paint: Paint, color: Rgb) -> T {
    match paint {
        Paint::Fill => element.assign("fill", color.to_hex()),
        Paint::Stroke { width } => {
            element.assign("fill", "none");
            element.assign("stroke", color.to_hex());
            element.assign("stroke-width", width);
        }
    }
    element
}

fn line_element(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
}

fn label(index: u32, x: f64, y: f64, anchor: &str, baseline: &str) -> Element {
    let mut text = Element::new("text");
    text.assign("x", x);
    text.assign("y", y);
    text.assign("text-anchor", anchor);
    text.assign("dominant-baseline", baseline);
    text.append(Text::new(index.to_string()));
    text
}

/// The svg crate omits the XML declaration, so we prepend it.
fn finish(doc: &Document) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

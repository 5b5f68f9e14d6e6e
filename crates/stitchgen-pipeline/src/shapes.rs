//! Shape renderer: one drawing primitive per stitched cell.
//!
//! [`render`] returns a lazy iterator in row-major cell order. Every
//! output format (raster, SVG) consumes the same primitives, so the
//! geometry is defined exactly once here.

use serde::{Deserialize, Serialize};

use crate::grid::StitchGrid;
use crate::layout::RenderTarget;
use crate::types::{FillShape, GenerationConfig, Point, Rgb};

/// How a closed primitive is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    /// Solid fill.
    Fill,
    /// Outline only, centred on the geometry.
    Stroke {
        /// Stroke width in output units.
        width: f64,
    },
}

/// A single drawing primitive in output coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapePrimitive {
    /// A circle.
    Circle {
        /// Centre.
        center: Point,
        /// Radius (of the stroke centreline when stroked).
        radius: f64,
        /// Fill or stroke.
        paint: Paint,
        /// Thread color.
        color: Rgb,
    },
    /// An axis-aligned rectangle.
    Rect {
        /// Top-left corner.
        origin: Point,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Fill or stroke.
        paint: Paint,
        /// Thread color.
        color: Rgb,
    },
    /// A straight stroked segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Thread color.
        color: Rgb,
    },
}

impl ShapePrimitive {
    /// The primitive's color.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        match *self {
            Self::Circle { color, .. } | Self::Rect { color, .. } | Self::Line { color, .. } => {
                color
            }
        }
    }
}

/// Size parameters shared by every cell of one rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ShapeStyle {
    shape: FillShape,
    color: Rgb,
    /// Unit stitch size `S`.
    stitch: f64,
    /// Scale multiplier `m = scale / 50`.
    multiplier: f64,
    /// Line-stitch inset per side as a fraction of the cell.
    inset: f64,
}

impl ShapeStyle {
    fn new(config: &GenerationConfig, target: &RenderTarget) -> Self {
        let scale = f64::from(config.shape_scale_percent);
        Self {
            shape: config.fill_shape,
            color: config.thread_color,
            stitch: target.stitch_size(),
            multiplier: scale / 50.0,
            inset: (1.0 - scale / 100.0) / 2.0,
        }
    }

    /// Nominal solid circle radius.
    fn radius(&self) -> f64 {
        self.stitch / 3.0 * self.multiplier
    }

    /// Nominal solid square side.
    fn side(&self) -> f64 {
        self.stitch * 2.0 / 3.0 * self.multiplier
    }

    /// Stroke width for hollow and line shapes.
    fn stroke(&self) -> f64 {
        (self.stitch / 10.0 * self.multiplier).max(1.0)
    }
}

/// Lazy iterator over the primitives of one rendering.
///
/// Clone it before iterating to replay the sequence from the first cell.
#[derive(Debug, Clone)]
pub struct Shapes<'a> {
    grid: &'a StitchGrid,
    target: RenderTarget,
    style: ShapeStyle,
    next_cell: usize,
    pending: Option<ShapePrimitive>,
}

/// Render every occupied cell of `grid` as shape primitives.
#[must_use]
pub fn render<'a>(
    grid: &'a StitchGrid,
    config: &GenerationConfig,
    target: &RenderTarget,
) -> Shapes<'a> {
    Shapes {
        grid,
        target: *target,
        style: ShapeStyle::new(config, target),
        next_cell: 0,
        pending: None,
    }
}

impl Shapes<'_> {
    /// Primitives for the cell at `(x, y)`. The second slot is only used
    /// by [`FillShape::CrossStitch`].
    fn cell(&self, x: u32, y: u32) -> (ShapePrimitive, Option<ShapePrimitive>) {
        let style = &self.style;
        let color = style.color;
        let center = self.target.cell_center(x, y);
        let square = |side: f64, paint: Paint| ShapePrimitive::Rect {
            origin: Point::new(center.x - side / 2.0, center.y - side / 2.0),
            width: side,
            height: side,
            paint,
            color,
        };

        match style.shape {
            FillShape::SolidCircle => (
                ShapePrimitive::Circle {
                    center,
                    radius: style.radius(),
                    paint: Paint::Fill,
                    color,
                },
                None,
            ),
            FillShape::HollowCircle => {
                let width = style.stroke();
                (
                    ShapePrimitive::Circle {
                        center,
                        radius: (style.radius() - width / 2.0).max(0.0),
                        paint: Paint::Stroke { width },
                        color,
                    },
                    None,
                )
            }
            FillShape::SolidSquare => (square(style.side(), Paint::Fill), None),
            FillShape::HollowSquare => {
                let width = style.stroke();
                (
                    square((style.side() - width).max(0.0), Paint::Stroke { width }),
                    None,
                )
            }
            FillShape::CrossStitch | FillShape::HalfForward | FillShape::HalfBackward => {
                let origin = self.target.cell_origin(x, y);
                let (cw, ch) = (self.target.cell_width(), self.target.cell_height());
                let (ix, iy) = (cw * style.inset, ch * style.inset);
                let (left, right) = (origin.x + ix, origin.x + cw - ix);
                let (top, bottom) = (origin.y + iy, origin.y + ch - iy);
                let width = style.stroke();
                let line = |from: Point, to: Point| ShapePrimitive::Line {
                    from,
                    to,
                    width,
                    color,
                };
                let backward = line(Point::new(left, top), Point::new(right, bottom));
                let forward = line(Point::new(left, bottom), Point::new(right, top));
                match style.shape {
                    FillShape::HalfForward => (forward, None),
                    FillShape::HalfBackward => (backward, None),
                    _ => (backward, Some(forward)),
                }
            }
        }
    }
}

impl Iterator for Shapes<'_> {
    type Item = ShapePrimitive;

    fn next(&mut self) -> Option<ShapePrimitive> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        let cells = self.grid.cells();
        let offset = cells.get(self.next_cell..)?.iter().position(|&c| c)?;
        let index = self.next_cell + offset;
        self.next_cell = index + 1;

        let width = self.grid.width() as usize;
        // index < width * height, both of which fit in u32.
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = ((index % width) as u32, (index / width) as u32);
        let (first, second) = self.cell(x, y);
        self.pending = second;
        Some(first)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::stretch_to_target;

    fn config(shape: FillShape, scale: u8) -> GenerationConfig {
        GenerationConfig {
            fill_shape: shape,
            shape_scale_percent: scale,
            ..GenerationConfig::default()
        }
    }

    /// A grid drawn in 30x30 cells.
    fn target_for(grid: &StitchGrid) -> RenderTarget {
        stretch_to_target(
            grid.dimensions(),
            f64::from(grid.width()) * 30.0,
            f64::from(grid.height()) * 30.0,
        )
        .unwrap()
    }

    fn render_one(shape: FillShape, scale: u8) -> Vec<ShapePrimitive> {
        let grid = StitchGrid::from_ascii(&["#"]).unwrap();
        render(&grid, &config(shape, scale), &target_for(&grid)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_primitive_per_cell_in_row_major_order() {
        let grid = StitchGrid::from_ascii(&[".#.", "#.#"]).unwrap();
        let target = target_for(&grid);
        let centers: Vec<Point> = render(&grid, &config(FillShape::SolidCircle, 50), &target)
            .map(|p| match p {
                ShapePrimitive::Circle { center, .. } => Some(center),
                _ => None,
            })
            .collect::<Option<_>>()
            .unwrap();
        assert_eq!(
            centers,
            vec![
                Point::new(45.0, 15.0),
                Point::new(15.0, 45.0),
                Point::new(75.0, 45.0),
            ]
        );
    }

    #[test]
    fn empty_grid_renders_nothing() {
        let grid = StitchGrid::from_ascii(&["...", "..."]).unwrap();
        let target = target_for(&grid);
        assert_eq!(render(&grid, &GenerationConfig::default(), &target).count(), 0);
    }

    #[test]
    fn solid_circle_at_nominal_scale() {
        let shapes = render_one(FillShape::SolidCircle, 50);
        assert_eq!(
            shapes,
            vec![ShapePrimitive::Circle {
                center: Point::new(15.0, 15.0),
                radius: 10.0,
                paint: Paint::Fill,
                color: Rgb::BLACK,
            }]
        );
    }

    #[test]
    fn solid_circle_radius_grows_with_scale() {
        let radius = |scale| match render_one(FillShape::SolidCircle, scale)[0] {
            ShapePrimitive::Circle { radius, .. } => radius,
            _ => f64::NAN,
        };
        let radii: Vec<f64> = (1..=100).map(radius).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn solid_square_is_centred() {
        let shapes = render_one(FillShape::SolidSquare, 50);
        let ShapePrimitive::Rect {
            origin,
            width,
            height,
            paint,
            ..
        } = shapes[0]
        else {
            unreachable!()
        };
        assert!(close(width, 20.0));
        assert!(close(height, 20.0));
        assert!(close(origin.x, 5.0));
        assert!(close(origin.y, 5.0));
        assert_eq!(paint, Paint::Fill);
    }

    #[test]
    fn hollow_circle_stroke_stays_inside_envelope() {
        let shapes = render_one(FillShape::HollowCircle, 100);
        let ShapePrimitive::Circle { radius, paint, .. } = shapes[0] else {
            unreachable!()
        };
        // S = 30, m = 2: envelope radius 20, stroke width 6.
        assert_eq!(paint, Paint::Stroke { width: 6.0 });
        assert!(close(radius + 3.0, 20.0));
    }

    #[test]
    fn hollow_square_stroke_stays_inside_envelope() {
        let shapes = render_one(FillShape::HollowSquare, 50);
        let ShapePrimitive::Rect {
            origin,
            width,
            paint,
            ..
        } = shapes[0]
        else {
            unreachable!()
        };
        // S = 30, m = 1: envelope side 20, stroke width 3.
        assert_eq!(paint, Paint::Stroke { width: 3.0 });
        assert!(close(width, 17.0));
        assert!(close(origin.x - 1.5, 5.0));
    }

    #[test]
    fn thin_strokes_are_at_least_one_unit() {
        let grid = StitchGrid::from_ascii(&["#"]).unwrap();
        let target = stretch_to_target(grid.dimensions(), 4.0, 4.0).unwrap();
        let shapes: Vec<_> = render(&grid, &config(FillShape::HalfForward, 10), &target).collect();
        assert!(matches!(shapes[0], ShapePrimitive::Line { width, .. } if close(width, 1.0)));
    }

    #[test]
    fn cross_stitch_emits_both_diagonals() {
        let shapes = render_one(FillShape::CrossStitch, 50);
        assert_eq!(shapes.len(), 2);
        // k = 0.5: inset a quarter of the cell on each side.
        let lines: Vec<(Point, Point)> = shapes
            .iter()
            .filter_map(|p| match *p {
                ShapePrimitive::Line { from, to, .. } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                (Point::new(7.5, 7.5), Point::new(22.5, 22.5)),
                (Point::new(7.5, 22.5), Point::new(22.5, 7.5)),
            ]
        );
    }

    #[test]
    fn half_stitch_directions() {
        let forward = render_one(FillShape::HalfForward, 100);
        assert_eq!(
            forward,
            vec![ShapePrimitive::Line {
                from: Point::new(0.0, 30.0),
                to: Point::new(30.0, 0.0),
                width: 6.0,
                color: Rgb::BLACK,
            }]
        );
        let backward = render_one(FillShape::HalfBackward, 100);
        assert!(matches!(
            backward[0],
            ShapePrimitive::Line { from, to, .. }
                if from == Point::new(0.0, 0.0) && to == Point::new(30.0, 30.0)
        ));
    }

    #[test]
    fn every_shape_uses_the_thread_color() {
        let grid = StitchGrid::from_ascii(&["##", "#."]).unwrap();
        let target = target_for(&grid);
        let red = Rgb::new(0xDE, 0x31, 0x3A);
        for shape in FillShape::ALL {
            let cfg = GenerationConfig {
                fill_shape: shape,
                thread_color: red,
                ..GenerationConfig::default()
            };
            assert!(render(&grid, &cfg, &target).all(|p| p.color() == red));
        }
    }

    #[test]
    fn cloned_iterator_replays_the_same_primitives() {
        let grid = StitchGrid::from_fn(6, 4, |x, y| (x + 2 * y) % 3 != 0).unwrap();
        let target = target_for(&grid);
        let shapes = render(&grid, &config(FillShape::CrossStitch, 70), &target);
        let first: Vec<_> = shapes.clone().collect();
        let second: Vec<_> = shapes.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2 * grid.occupied_count());
    }

    #[test]
    fn rendering_is_deterministic() {
        let grid = StitchGrid::from_fn(5, 5, |x, y| x * y % 2 == 1).unwrap();
        let target = target_for(&grid);
        let cfg = config(FillShape::HollowSquare, 33);
        let a: Vec<_> = render(&grid, &cfg, &target).collect();
        let b: Vec<_> = render(&grid, &cfg, &target).collect();
        assert_eq!(a, b);
    }
}

//! Outline contour builder: an inflated silhouette outline.
//!
//! Every occupied cell contributes short fragments around the parts of
//! its boundary that face the exterior:
//!
//! - a straight segment parallel to each boundary edge, pushed outward
//!   by the inflation distance;
//! - a clockwise quarter arc at each convex corner, centred on the cell
//!   corner, joining the two straight segments that meet there;
//! - a counter-clockwise quarter arc at each concave corner (open
//!   diagonal, stitched edge neighbors), centred on the shared grid
//!   corner.
//!
//! Edges facing an enclosed hole are not boundary edges, so holes get
//! no outline. Fragments are independent and unordered: a renderer
//! strokes each one separately with the same style and the overlaps at
//! shared corners are invisible.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::grid::{ExteriorMask, StitchGrid};
use crate::layout::RenderTarget;
use crate::neighborhood::{Corner, CornerKind, Neighborhood, Side};
use crate::types::{Point, Rgb};

/// Stroke width of the outline in output units.
pub const OUTLINE_STROKE_WIDTH: f64 = 1.0;

/// Rotational direction of an arc in y-down output coordinates.
///
/// [`Clockwise`](Self::Clockwise) corresponds to SVG `sweep-flag = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sweep {
    /// Increasing angle (clockwise on screen).
    Clockwise,
    /// Decreasing angle (counter-clockwise on screen).
    CounterClockwise,
}

/// One outline path command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Start a new fragment.
    MoveTo(Point),
    /// Straight line from the current point.
    LineTo(Point),
    /// Circular arc from the current point to `to` around `center`.
    ArcTo {
        /// Arc centre.
        center: Point,
        /// Arc radius.
        radius: f64,
        /// Rotational direction.
        sweep: Sweep,
        /// End point.
        to: Point,
    },
}

/// Counts of outline fragments by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineStats {
    /// Straight offset segments.
    pub straight: usize,
    /// Convex corner arcs.
    pub convex_arcs: usize,
    /// Concave corner arcs.
    pub concave_arcs: usize,
}

impl OutlineStats {
    /// Total number of fragments.
    #[must_use]
    pub const fn fragments(&self) -> usize {
        self.straight + self.convex_arcs + self.concave_arcs
    }
}

/// The outline of one silhouette in output coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlinePath {
    commands: Vec<PathCommand>,
    color: Rgb,
    stroke_width: f64,
}

impl OutlinePath {
    /// An outline with no fragments.
    #[must_use]
    pub const fn empty(color: Rgb) -> Self {
        Self {
            commands: Vec::new(),
            color,
            stroke_width: OUTLINE_STROKE_WIDTH,
        }
    }

    /// Whether the outline has no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All commands, fragment after fragment.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Stroke color.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Stroke width in output units.
    #[must_use]
    pub const fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Independent fragments, each starting with a [`PathCommand::MoveTo`].
    pub fn fragments(&self) -> impl Iterator<Item = &[PathCommand]> + '_ {
        self.commands
            .split_inclusive(|c| matches!(c, PathCommand::LineTo(_) | PathCommand::ArcTo { .. }))
    }

    /// Count fragments by kind.
    #[must_use]
    pub fn stats(&self) -> OutlineStats {
        self.commands
            .iter()
            .fold(OutlineStats::default(), |mut stats, c| {
                match c {
                    PathCommand::MoveTo(_) => {}
                    PathCommand::LineTo(_) => stats.straight += 1,
                    PathCommand::ArcTo {
                        sweep: Sweep::Clockwise,
                        ..
                    } => stats.convex_arcs += 1,
                    PathCommand::ArcTo {
                        sweep: Sweep::CounterClockwise,
                        ..
                    } => stats.concave_arcs += 1,
                }
                stats
            })
    }

    fn line(&mut self, from: Point, to: Point) {
        self.commands.push(PathCommand::MoveTo(from));
        self.commands.push(PathCommand::LineTo(to));
    }

    fn arc(&mut self, from: Point, center: Point, radius: f64, sweep: Sweep, to: Point) {
        self.commands.push(PathCommand::MoveTo(from));
        self.commands.push(PathCommand::ArcTo {
            center,
            radius,
            sweep,
            to,
        });
    }
}

/// Start angle and signed sweep (radians, y-down) of an arc from `from`
/// to `to` around `center`.
///
/// The sweep is positive for [`Sweep::Clockwise`] and negative for
/// [`Sweep::CounterClockwise`]. Coincident endpoints yield a zero sweep.
#[must_use]
pub fn arc_angles(from: Point, center: Point, to: Point, sweep: Sweep) -> (f64, f64) {
    let start = (from.y - center.y).atan2(from.x - center.x);
    let end = (to.y - center.y).atan2(to.x - center.x);
    let delta = match sweep {
        Sweep::Clockwise => (end - start).rem_euclid(TAU),
        Sweep::CounterClockwise => -(start - end).rem_euclid(TAU),
    };
    (start, delta)
}

/// Build the outline of `grid` inflated by `inflation` output units.
///
/// Returns an empty outline when `inflation` is zero (or not positive).
#[must_use]
pub fn build_outline(
    grid: &StitchGrid,
    exterior: &ExteriorMask,
    inflation: f64,
    color: Rgb,
    target: &RenderTarget,
) -> OutlinePath {
    let mut path = OutlinePath::empty(color);
    if inflation.is_nan() || inflation <= 0.0 {
        return path;
    }

    for (x, y) in grid.iter_occupied() {
        let cell = CellBox {
            sx: target.column_x(x),
            sy: target.row_y(y),
            ex: target.column_x(x + 1),
            ey: target.row_y(y + 1),
            o: inflation,
        };
        let n = Neighborhood::of(exterior, x, y);

        for side in Side::ALL {
            if n.is_boundary(side) {
                let (from, to) = cell.edge(side);
                path.line(from, to);
            }
        }
        for corner in Corner::ALL {
            let (a, b) = cell.corner_ends(corner);
            let center = cell.corner(corner);
            match n.corner_kind(corner) {
                Some(CornerKind::Convex) => path.arc(a, center, inflation, Sweep::Clockwise, b),
                Some(CornerKind::Concave) => {
                    path.arc(b, center, inflation, Sweep::CounterClockwise, a);
                }
                None => {}
            }
        }
    }

    let stats = path.stats();
    log::debug!(
        "outline (inflation {inflation}): {} straight, {} convex, {} concave",
        stats.straight,
        stats.convex_arcs,
        stats.concave_arcs,
    );
    path
}

/// A cell rectangle in output coordinates plus the inflation distance.
struct CellBox {
    sx: f64,
    sy: f64,
    ex: f64,
    ey: f64,
    o: f64,
}

impl CellBox {
    /// The offset segment for a boundary edge.
    fn edge(&self, side: Side) -> (Point, Point) {
        let Self { sx, sy, ex, ey, o } = *self;
        match side {
            Side::North => (Point::new(sx, sy - o), Point::new(ex, sy - o)),
            Side::South => (Point::new(sx, ey + o), Point::new(ex, ey + o)),
            Side::West => (Point::new(sx - o, sy), Point::new(sx - o, ey)),
            Side::East => (Point::new(ex + o, sy), Point::new(ex + o, ey)),
        }
    }

    /// The grid corner point.
    const fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::NorthWest => Point::new(self.sx, self.sy),
            Corner::NorthEast => Point::new(self.ex, self.sy),
            Corner::SouthEast => Point::new(self.ex, self.ey),
            Corner::SouthWest => Point::new(self.sx, self.ey),
        }
    }

    /// The two offset-segment endpoints touching `corner`, in clockwise
    /// order around it.
    fn corner_ends(&self, corner: Corner) -> (Point, Point) {
        let c = self.corner(corner);
        let o = self.o;
        match corner {
            Corner::NorthWest => (Point::new(c.x - o, c.y), Point::new(c.x, c.y - o)),
            Corner::NorthEast => (Point::new(c.x, c.y - o), Point::new(c.x + o, c.y)),
            Corner::SouthEast => (Point::new(c.x + o, c.y), Point::new(c.x, c.y + o)),
            Corner::SouthWest => (Point::new(c.x, c.y + o), Point::new(c.x - o, c.y)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::exterior::classify_exterior;
    use crate::layout::stretch_to_target;

    /// Unit cells with the grid at the origin.
    fn unit_target(grid: &StitchGrid) -> RenderTarget {
        stretch_to_target(
            grid.dimensions(),
            f64::from(grid.width()),
            f64::from(grid.height()),
        )
        .unwrap()
    }

    fn outline(rows: &[&str], inflation: f64) -> OutlinePath {
        let grid = StitchGrid::from_ascii(rows).unwrap();
        let mask = classify_exterior(&grid);
        build_outline(&grid, &mask, inflation, Rgb::BLACK, &unit_target(&grid))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Every fragment start point, paired with its drawing command.
    fn segments(path: &OutlinePath) -> Vec<(Point, PathCommand)> {
        path.fragments()
            .map(|f| match f {
                [PathCommand::MoveTo(from), cmd] => Some((*from, *cmd)),
                _ => None,
            })
            .collect::<Option<_>>()
            .unwrap()
    }

    fn end_point(cmd: PathCommand) -> Point {
        match cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) | PathCommand::ArcTo { to: p, .. } => p,
        }
    }

    #[test]
    fn zero_inflation_is_empty() {
        let path = outline(&["##", "##"], 0.0);
        assert!(path.is_empty());
        assert_eq!(path.stats().fragments(), 0);
    }

    #[test]
    fn empty_grid_has_no_outline() {
        assert!(outline(&["...", "..."], 3.0).is_empty());
    }

    #[test]
    fn full_4x4_grid_is_inflated_rectangle() {
        let path = outline(&["####", "####", "####", "####"], 2.0);
        let stats = path.stats();
        assert_eq!(stats.straight, 16);
        assert_eq!(stats.convex_arcs, 4);
        assert_eq!(stats.concave_arcs, 0);

        let on_rect = |p: Point| {
            (close(p.y, -2.0) || close(p.y, 6.0)) && (0.0..=4.0).contains(&p.x)
                || (close(p.x, -2.0) || close(p.x, 6.0)) && (0.0..=4.0).contains(&p.y)
        };
        let mut centers = Vec::new();
        for (from, cmd) in segments(&path) {
            assert!(on_rect(from), "{from:?} off the inflated rectangle");
            assert!(on_rect(end_point(cmd)));
            if let PathCommand::ArcTo {
                center,
                radius,
                sweep,
                to,
            } = cmd
            {
                assert!(close(radius, 2.0));
                assert_eq!(sweep, Sweep::Clockwise);
                assert!(close(from.distance(center), 2.0));
                assert!(close(to.distance(center), 2.0));
                centers.push((center.x, center.y));
            }
        }
        centers.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(centers, vec![(0.0, 0.0), (0.0, 4.0), (4.0, 0.0), (4.0, 4.0)]);
    }

    #[test]
    fn single_cell_is_rounded_square() {
        let stats = outline(&["#"], 0.5).stats();
        assert_eq!(stats.straight, 4);
        assert_eq!(stats.convex_arcs, 4);
        assert_eq!(stats.concave_arcs, 0);
    }

    #[test]
    fn enclosed_hole_gets_no_outline() {
        let rows = [
            "........",
            "........",
            "..###...",
            "..#.#...",
            "..###...",
            "........",
            "........",
            "........",
        ];
        let path = outline(&rows, 0.25);
        let stats = path.stats();
        assert_eq!(stats.straight, 12);
        assert_eq!(stats.convex_arcs, 4);
        assert_eq!(stats.concave_arcs, 0);

        // Nothing is drawn inside the ring's outer boundary.
        for (from, cmd) in segments(&path) {
            for p in [from, end_point(cmd)] {
                let inside = p.x > 2.0 && p.x < 5.0 && p.y > 2.0 && p.y < 5.0;
                assert!(!inside, "{p:?} drawn inside the ring");
            }
        }
    }

    #[test]
    fn l_shape_has_one_concave_corner() {
        let path = outline(&[".##", "###", "###"], 0.5);
        let stats = path.stats();
        assert_eq!(stats.convex_arcs, 5);
        assert_eq!(stats.concave_arcs, 1);

        let concave: Vec<_> = segments(&path)
            .into_iter()
            .filter_map(|(from, cmd)| match cmd {
                PathCommand::ArcTo {
                    center,
                    sweep: Sweep::CounterClockwise,
                    to,
                    ..
                } => Some((from, center, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            concave,
            vec![(Point::new(1.0, 0.5), Point::new(1.0, 1.0), Point::new(0.5, 1.0))]
        );
    }

    #[test]
    fn convex_arc_sweeps_a_quarter_turn_clockwise() {
        let path = outline(&["#"], 1.0);
        for (from, cmd) in segments(&path) {
            if let PathCommand::ArcTo {
                center, sweep, to, ..
            } = cmd
            {
                let (_, delta) = arc_angles(from, center, to, sweep);
                assert!(close(delta, FRAC_PI_2), "delta {delta}");
            }
        }
    }

    #[test]
    fn concave_arc_sweeps_a_quarter_turn_counter_clockwise() {
        let (start, delta) = arc_angles(
            Point::new(1.0, 0.5),
            Point::new(1.0, 1.0),
            Point::new(0.5, 1.0),
            Sweep::CounterClockwise,
        );
        assert!(close(start, -FRAC_PI_2));
        assert!(close(delta, -FRAC_PI_2));
    }

    #[test]
    fn target_offset_and_scale_are_applied() {
        let grid = StitchGrid::from_ascii(&["#"]).unwrap();
        let mask = classify_exterior(&grid);
        let target = stretch_to_target(grid.dimensions(), 30.0, 30.0)
            .unwrap()
            .with_margin(10.0);
        let path = build_outline(&grid, &mask, 2.0, Rgb::BLACK, &target);
        let (from, cmd) = segments(&path)[0];
        assert_eq!(from, Point::new(10.0, 8.0));
        assert_eq!(cmd, PathCommand::LineTo(Point::new(40.0, 8.0)));
    }

    #[test]
    fn outline_is_deterministic() {
        let rows = [".#..#", "####.", ".#.##", "##..#"];
        assert_eq!(outline(&rows, 1.5), outline(&rows, 1.5));
    }

    #[test]
    fn fragments_pair_moves_with_draws() {
        let path = outline(&["##.", "#.#"], 1.0);
        for fragment in path.fragments() {
            assert_eq!(fragment.len(), 2);
            assert!(matches!(fragment[0], PathCommand::MoveTo(_)));
        }
        assert_eq!(path.fragments().count(), path.stats().fragments());
    }
}

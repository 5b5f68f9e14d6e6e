//! Eight-neighbor exterior bitmask for a single stitch cell.
//!
//! The outline builder looks at each occupied cell once, packs the
//! exterior state of its eight neighbors into a [`Neighborhood`], and
//! derives every edge and corner decision from that byte. Cells beyond
//! the grid count as exterior.

use crate::grid::ExteriorMask;

/// One of the eight neighbor directions, in clockwise order from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Grid offset `(dx, dy)` with y growing downward.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A cell edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides, clockwise from north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// The neighbor across this edge.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::North => Direction::North,
            Self::East => Direction::East,
            Self::South => Direction::South,
            Self::West => Direction::West,
        }
    }
}

/// A cell corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    /// All corners, clockwise from north-west.
    pub const ALL: [Self; 4] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// The two edges meeting at this corner.
    #[must_use]
    pub const fn sides(self) -> (Side, Side) {
        match self {
            Self::NorthWest => (Side::North, Side::West),
            Self::NorthEast => (Side::North, Side::East),
            Self::SouthEast => (Side::South, Side::East),
            Self::SouthWest => (Side::South, Side::West),
        }
    }

    /// The neighbor touching only this corner.
    #[must_use]
    pub const fn diagonal(self) -> Direction {
        match self {
            Self::NorthWest => Direction::NorthWest,
            Self::NorthEast => Direction::NorthEast,
            Self::SouthEast => Direction::SouthEast,
            Self::SouthWest => Direction::SouthWest,
        }
    }
}

/// How the outline turns at a cell corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerKind {
    /// Both adjacent edges are on the boundary: round the outside corner.
    Convex,
    /// Only the diagonal neighbor is exterior: round the inside corner.
    Concave,
}

/// Exterior state of the eight cells around one cell, one bit per
/// [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Neighborhood(u8);

impl Neighborhood {
    /// Wrap a raw bitmask (bit `d as u8` set means direction `d` is exterior).
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Sample the neighborhood of `(x, y)` from an exterior mask.
    #[must_use]
    pub fn of(exterior: &ExteriorMask, x: u32, y: u32) -> Self {
        let bits = Direction::ALL.iter().fold(0u8, |bits, &dir| {
            let (dx, dy) = dir.offset();
            if exterior.exterior_or_off_grid(i64::from(x) + dx, i64::from(y) + dy) {
                bits | dir.bit()
            } else {
                bits
            }
        });
        Self(bits)
    }

    /// Whether the neighbor in `dir` is exterior (or off-grid).
    #[must_use]
    pub const fn is_exterior(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    /// Whether `side` lies on the silhouette's outer boundary.
    #[must_use]
    pub const fn is_boundary(self, side: Side) -> bool {
        self.is_exterior(side.direction())
    }

    /// Convex rule: both edges meeting at `corner` are boundary edges.
    #[must_use]
    pub const fn is_convex(self, corner: Corner) -> bool {
        let (a, b) = corner.sides();
        self.is_boundary(a) && self.is_boundary(b)
    }

    /// Concave rule: the diagonal neighbor is exterior while neither
    /// adjacent edge is a boundary edge.
    #[must_use]
    pub const fn is_concave(self, corner: Corner) -> bool {
        let (a, b) = corner.sides();
        self.is_exterior(corner.diagonal()) && !self.is_boundary(a) && !self.is_boundary(b)
    }

    /// The corner treatment at `corner`, if any.
    #[must_use]
    pub const fn corner_kind(self, corner: Corner) -> Option<CornerKind> {
        if self.is_convex(corner) {
            Some(CornerKind::Convex)
        } else if self.is_concave(corner) {
            Some(CornerKind::Concave)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exterior::classify_exterior;
    use crate::grid::StitchGrid;

    fn all_masks() -> impl Iterator<Item = Neighborhood> {
        (0..=u8::MAX).map(Neighborhood::from_bits)
    }

    #[test]
    fn convex_and_concave_are_mutually_exclusive() {
        for n in all_masks() {
            for corner in Corner::ALL {
                assert!(
                    !(n.is_convex(corner) && n.is_concave(corner)),
                    "mask {:#010b} fires both rules at {corner:?}",
                    n.bits()
                );
            }
        }
    }

    #[test]
    fn predicates_match_their_definitions_for_every_mask() {
        for n in all_masks() {
            let ext = |d: Direction| n.bits() & (1 << d as u8) != 0;
            for side in Side::ALL {
                assert_eq!(n.is_boundary(side), ext(side.direction()));
            }
            for corner in Corner::ALL {
                let (a, b) = corner.sides();
                let convex = ext(a.direction()) && ext(b.direction());
                let concave =
                    ext(corner.diagonal()) && !ext(a.direction()) && !ext(b.direction());
                assert_eq!(n.is_convex(corner), convex);
                assert_eq!(n.is_concave(corner), concave);
                let expected = if convex {
                    Some(CornerKind::Convex)
                } else if concave {
                    Some(CornerKind::Concave)
                } else {
                    None
                };
                assert_eq!(n.corner_kind(corner), expected);
            }
        }
    }

    #[test]
    fn mask_counts_per_rule() {
        // Each convex corner needs two specific bits: 2^6 masks each.
        // Each concave corner fixes three bits: 2^5 masks each.
        for corner in Corner::ALL {
            assert_eq!(all_masks().filter(|n| n.is_convex(corner)).count(), 64);
            assert_eq!(all_masks().filter(|n| n.is_concave(corner)).count(), 32);
        }
    }

    #[test]
    fn isolated_cell_sees_everything_exterior() {
        let grid = StitchGrid::from_ascii(&["...", ".#.", "..."]).unwrap();
        let mask = classify_exterior(&grid);
        let n = Neighborhood::of(&mask, 1, 1);
        assert_eq!(n.bits(), u8::MAX);
        for corner in Corner::ALL {
            assert_eq!(n.corner_kind(corner), Some(CornerKind::Convex));
        }
    }

    #[test]
    fn off_grid_neighbors_are_exterior() {
        let grid = StitchGrid::from_ascii(&["#"]).unwrap();
        let mask = classify_exterior(&grid);
        assert_eq!(Neighborhood::of(&mask, 0, 0).bits(), u8::MAX);
    }

    #[test]
    fn inner_corner_of_l_shape_is_concave() {
        // The cell at (1, 1) has stitches north and west; only the
        // north-west diagonal is open.
        let grid = StitchGrid::from_ascii(&[".##", "###", "###"]).unwrap();
        let mask = classify_exterior(&grid);
        let n = Neighborhood::of(&mask, 1, 1);
        assert!(n.is_exterior(Direction::NorthWest));
        assert_eq!(n.corner_kind(Corner::NorthWest), Some(CornerKind::Concave));
        assert_eq!(n.corner_kind(Corner::NorthEast), None);
    }

    #[test]
    fn block_corner_is_convex() {
        let grid = StitchGrid::from_ascii(&["....", ".##.", ".##.", "...."]).unwrap();
        let mask = classify_exterior(&grid);
        let n = Neighborhood::of(&mask, 1, 1);
        assert_eq!(n.corner_kind(Corner::NorthWest), Some(CornerKind::Convex));
        assert_eq!(n.corner_kind(Corner::SouthEast), None);
    }

    #[test]
    fn hole_neighbors_are_not_exterior() {
        let grid = StitchGrid::from_ascii(&["###", "#.#", "###"]).unwrap();
        let mask = classify_exterior(&grid);
        let n = Neighborhood::of(&mask, 1, 0);
        assert!(!n.is_boundary(Side::South));
        assert!(n.is_boundary(Side::North));
    }
}

//! Exterior classification: which empty cells lie outside the silhouette.
//!
//! A multi-source breadth-first flood fill starts from every empty
//! border cell and spreads through 4-connected empty neighbors. Empty
//! cells it never reaches are holes enclosed by stitches; the outline
//! builder treats those as interior and draws nothing around them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{ExteriorMask, StitchGrid};

/// The three-way partition of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellClass {
    /// A stitched cell.
    Occupied,
    /// An empty cell connected to the border.
    Exterior,
    /// An empty cell enclosed by stitches.
    Hole,
}

/// Offsets of the four edge-sharing neighbors (N, S, W, E).
const NEIGHBORS_4: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Compute the exterior mask of `grid`.
///
/// Runs in `O(width * height)`: every cell is enqueued at most once.
#[must_use]
pub fn classify_exterior(grid: &StitchGrid) -> ExteriorMask {
    let (w, h) = (grid.width(), grid.height());
    let index = |x: u32, y: u32| y as usize * w as usize + x as usize;

    let mut exterior = vec![false; w as usize * h as usize];
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

    let seed = |x: u32, y: u32, exterior: &mut [bool], queue: &mut VecDeque<(u32, u32)>| {
        let i = index(x, y);
        if !grid.is_occupied(x, y) && !exterior[i] {
            exterior[i] = true;
            queue.push_back((x, y));
        }
    };

    for y in 0..h {
        seed(0, y, &mut exterior, &mut queue);
        seed(w - 1, y, &mut exterior, &mut queue);
    }
    for x in 0..w {
        seed(x, 0, &mut exterior, &mut queue);
        seed(x, h - 1, &mut exterior, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in NEIGHBORS_4 {
            let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
            if !grid.contains(nx, ny) || grid.occupied_at(nx, ny) {
                continue;
            }
            // contains() guarantees both coordinates are in 0..w / 0..h.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (nx, ny) = (nx as u32, ny as u32);
            let i = index(nx, ny);
            if !exterior[i] {
                exterior[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    let mask = ExteriorMask::from_cells(w, h, exterior);
    log::debug!(
        "exterior classification on {w}x{h}: {} exterior, {} holes",
        mask.exterior_count(),
        w as usize * h as usize - grid.occupied_count() - mask.exterior_count(),
    );
    mask
}

/// Classify a single on-grid cell.
#[must_use]
pub fn cell_class(grid: &StitchGrid, exterior: &ExteriorMask, x: u32, y: u32) -> CellClass {
    if grid.is_occupied(x, y) {
        CellClass::Occupied
    } else if exterior.is_exterior(x, y) {
        CellClass::Exterior
    } else {
        CellClass::Hole
    }
}

/// Number of enclosed empty cells.
#[must_use]
pub fn hole_count(grid: &StitchGrid, exterior: &ExteriorMask) -> usize {
    grid.cells()
        .iter()
        .zip(exterior.cells())
        .filter(|&(&occupied, &ext)| !occupied && !ext)
        .count()
}

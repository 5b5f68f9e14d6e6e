//! Boolean cell grids: the stitch occupancy grid and the exterior mask.
//!
//! Both are row-major, immutable once built, and at least 1x1.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError};

/// Row-major boolean storage shared by [`StitchGrid`] and
/// [`ExteriorMask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Cells {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Cells {
    fn new(width: u32, height: u32, data: Vec<bool>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(PipelineError::InvalidConfig(format!(
                "grid {width}x{height} needs {expected} cells, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    const fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn get(&self, x: i64, y: i64) -> Option<bool> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(self.data[self.index(x, y)])
    }

    fn count(&self) -> usize {
        self.data.iter().filter(|&&c| c).count()
    }
}

/// The quantized silhouette: `true` cells receive a stitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchGrid(Cells);

impl StitchGrid {
    /// Build a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if either dimension is
    /// zero or `cells.len() != width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, PipelineError> {
        Cells::new(width, height, cells).map(Self)
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self, PipelineError> {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, cells)
    }

    /// Parse a grid drawn as text: `#` is occupied, anything else empty.
    ///
    /// ```
    /// use stitchgen_pipeline::StitchGrid;
    ///
    /// let grid = StitchGrid::from_ascii(&["#.", ".#"]).unwrap();
    /// assert!(grid.is_occupied(0, 0));
    /// assert!(!grid.is_occupied(1, 0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if there are no rows, a
    /// row is empty, or rows differ in length.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, PipelineError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(PipelineError::InvalidConfig(
                "ascii grid rows must all have the same length".to_owned(),
            ));
        }
        let cells = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        let width = u32::try_from(width)
            .map_err(|_| PipelineError::InvalidConfig("ascii grid too wide".to_owned()))?;
        let height = u32::try_from(rows.len())
            .map_err(|_| PipelineError::InvalidConfig("ascii grid too tall".to_owned()))?;
        Self::new(width, height, cells)
    }

    /// Number of stitch columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.0.width
    }

    /// Number of stitch rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.0.height
    }

    /// Grid size in stitches.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.0.width,
            height: self.0.height,
        }
    }

    /// Whether the cell at `(x, y)` is stitched. Off-grid cells are empty.
    #[must_use]
    pub fn is_occupied(&self, x: u32, y: u32) -> bool {
        self.occupied_at(i64::from(x), i64::from(y))
    }

    /// Signed-coordinate variant of [`is_occupied`](Self::is_occupied).
    #[must_use]
    pub fn occupied_at(&self, x: i64, y: i64) -> bool {
        self.0.get(x, y).unwrap_or(false)
    }

    /// Whether `(x, y)` lies on the grid.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.0.get(x, y).is_some()
    }

    /// Number of stitched cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.0.count()
    }

    /// Coordinates of every stitched cell in row-major order.
    // Both quotient and remainder fit in u32: i < width * height.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter_occupied(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.0.width;
        self.0
            .data
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(move |(i, _)| {
                let i = i as u64;
                let w = u64::from(width);
                ((i % w) as u32, (i / w) as u32)
            })
    }

    /// Row-major cell values.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.0.data
    }

    /// Render the grid as `#`/`.` rows, the inverse of
    /// [`from_ascii`](Self::from_ascii).
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        self.0
            .data
            .chunks(self.0.width as usize)
            .map(|row| row.iter().map(|&c| if c { '#' } else { '.' }).collect())
            .collect()
    }
}

/// Empty cells reachable from the grid border without crossing a stitch.
///
/// Built by [`crate::exterior::classify_exterior`]; enclosed holes stay
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExteriorMask(Cells);

impl ExteriorMask {
    /// Wrap cells computed for a grid of the same, already validated,
    /// dimensions.
    pub(crate) const fn from_cells(width: u32, height: u32, data: Vec<bool>) -> Self {
        Self(Cells {
            width,
            height,
            data,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.0.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.0.height
    }

    /// Whether the on-grid cell at `(x, y)` is exterior.
    #[must_use]
    pub fn is_exterior(&self, x: u32, y: u32) -> bool {
        self.0.get(i64::from(x), i64::from(y)).unwrap_or(false)
    }

    /// Exterior test that treats everything beyond the grid as exterior.
    #[must_use]
    pub fn exterior_or_off_grid(&self, x: i64, y: i64) -> bool {
        self.0.get(x, y).unwrap_or(true)
    }

    /// Number of exterior cells.
    #[must_use]
    pub fn exterior_count(&self) -> usize {
        self.0.count()
    }

    /// Row-major cell values.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.0.data
    }
}

//! Layout: map stitch cells onto an output surface.
//!
//! A [`RenderTarget`] describes where each grid cell lands in output
//! units (canvas pixels, SVG user units, print pixels). The same target
//! drives the outline builder and the shape renderer, so every output
//! format shares one coordinate formula.
//!
//! [`gridlines`] derives the fabrication overlay: a minor line at every
//! stitch boundary, a major line and ruler label at every multiple of
//! the fabric count.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, Point};

/// Output coordinate space for one rendering.
///
/// Only built by [`fit_to_target`], [`stretch_to_target`] and
/// [`fit_physical`], so every target has a finite, positive area and
/// positive cell sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderTarget {
    width: f64,
    height: f64,
    offset_x: f64,
    offset_y: f64,
    cell_width: f64,
    cell_height: f64,
    grid: Dimensions,
}

impl RenderTarget {
    /// Full output width, including letterbox margins.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Full output height, including letterbox margins.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Left edge of the grid.
    #[must_use]
    pub const fn offset_x(&self) -> f64 {
        self.offset_x
    }

    /// Top edge of the grid.
    #[must_use]
    pub const fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// Width of one stitch cell.
    #[must_use]
    pub const fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Height of one stitch cell.
    #[must_use]
    pub const fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Grid size in stitches.
    #[must_use]
    pub const fn grid(&self) -> Dimensions {
        self.grid
    }

    /// The unit stitch size: the smaller cell dimension.
    #[must_use]
    pub fn stitch_size(&self) -> f64 {
        self.cell_width.min(self.cell_height)
    }

    /// Top-left corner of cell `(x, y)`.
    #[must_use]
    pub fn cell_origin(&self, x: u32, y: u32) -> Point {
        Point::new(self.column_x(x), self.row_y(y))
    }

    /// Centre of cell `(x, y)`.
    #[must_use]
    pub fn cell_center(&self, x: u32, y: u32) -> Point {
        let origin = self.cell_origin(x, y);
        Point::new(
            origin.x + self.cell_width / 2.0,
            origin.y + self.cell_height / 2.0,
        )
    }

    /// X coordinate of the vertical grid line left of column `i`.
    #[must_use]
    pub fn column_x(&self, i: u32) -> f64 {
        f64::from(i).mul_add(self.cell_width, self.offset_x)
    }

    /// Y coordinate of the horizontal grid line above row `i`.
    #[must_use]
    pub fn row_y(&self, i: u32) -> f64 {
        f64::from(i).mul_add(self.cell_height, self.offset_y)
    }

    /// Width covered by the grid itself.
    #[must_use]
    pub fn content_width(&self) -> f64 {
        f64::from(self.grid.width) * self.cell_width
    }

    /// Height covered by the grid itself.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        f64::from(self.grid.height) * self.cell_height
    }

    /// Grow the surface by `margin` on every side, keeping the grid where
    /// it is relative to its cells. Used to make room for chart rulers.
    ///
    /// A non-positive or non-finite margin, or one that would overflow the
    /// surface size, leaves the target unchanged.
    #[must_use]
    pub fn with_margin(self, margin: f64) -> Self {
        let width = margin.mul_add(2.0, self.width);
        let height = margin.mul_add(2.0, self.height);
        if !margin.is_finite() || margin <= 0.0 || !width.is_finite() || !height.is_finite() {
            return self;
        }
        Self {
            width,
            height,
            offset_x: self.offset_x + margin,
            offset_y: self.offset_y + margin,
            ..self
        }
    }
}

/// Fit a grid inside a `width x height` box with square cells, centring
/// it with letterbox margins on the slack axis.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidTarget`] if the box has no area (or a
/// non-finite side) and [`PipelineError::InvalidConfig`] if the grid has
/// a zero dimension.
pub fn fit_to_target(
    grid: Dimensions,
    width: f64,
    height: f64,
) -> Result<RenderTarget, PipelineError> {
    check_target(grid, width, height)?;
    let cell = (width / f64::from(grid.width)).min(height / f64::from(grid.height));
    let content_w = cell * f64::from(grid.width);
    let content_h = cell * f64::from(grid.height);
    Ok(RenderTarget {
        width,
        height,
        offset_x: (width - content_w) / 2.0,
        offset_y: (height - content_h) / 2.0,
        cell_width: cell,
        cell_height: cell,
        grid,
    })
}

/// Fill the whole `width x height` box, letting cells become
/// rectangular when the aspect ratios differ.
///
/// # Errors
///
/// Same as [`fit_to_target`].
pub fn stretch_to_target(
    grid: Dimensions,
    width: f64,
    height: f64,
) -> Result<RenderTarget, PipelineError> {
    check_target(grid, width, height)?;
    Ok(RenderTarget {
        width,
        height,
        offset_x: 0.0,
        offset_y: 0.0,
        cell_width: width / f64::from(grid.width),
        cell_height: height / f64::from(grid.height),
        grid,
    })
}

/// Size the target so the pattern prints at its real size on
/// `fabric_count`-count fabric at `dpi` output pixels per inch.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a zero fabric count and
/// [`PipelineError::InvalidTarget`] for a non-positive `dpi`.
pub fn fit_physical(
    grid: Dimensions,
    fabric_count: u32,
    dpi: f64,
) -> Result<RenderTarget, PipelineError> {
    check_fabric_count(fabric_count)?;
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(PipelineError::InvalidTarget(format!(
            "dpi must be positive, got {dpi}"
        )));
    }
    let cell = dpi / f64::from(fabric_count);
    stretch_to_target(
        grid,
        cell * f64::from(grid.width),
        cell * f64::from(grid.height),
    )
}

/// Finished size of the stitched pattern in inches `(width, height)`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a zero fabric count.
pub fn physical_size_inches(
    grid: Dimensions,
    fabric_count: u32,
) -> Result<(f64, f64), PipelineError> {
    check_fabric_count(fabric_count)?;
    let count = f64::from(fabric_count);
    Ok((f64::from(grid.width) / count, f64::from(grid.height) / count))
}

/// Parse a fabric count such as `"14-count"`, `"14"` or `"14 count"`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if no positive leading
/// integer is present.
pub fn parse_fabric_count(text: &str) -> Result<u32, PipelineError> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let count: u32 = digits
        .parse()
        .map_err(|_| PipelineError::InvalidConfig(format!("invalid fabric count '{text}'")))?;
    check_fabric_count(count)?;
    Ok(count)
}

/// Gridline and ruler placement for a fabrication chart.
///
/// All values are stitch indices; map them to coordinates with
/// [`RenderTarget::column_x`] and [`RenderTarget::row_y`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gridlines {
    /// Fabric count the major lines are spaced by.
    pub fabric_count: u32,
    /// Vertical lines at every stitch boundary, `0..=width`.
    pub minor_columns: Vec<u32>,
    /// Horizontal lines at every stitch boundary, `0..=height`.
    pub minor_rows: Vec<u32>,
    /// Heavier vertical lines at interior multiples of the fabric count.
    pub major_columns: Vec<u32>,
    /// Heavier horizontal lines at interior multiples of the fabric count.
    pub major_rows: Vec<u32>,
    /// Column indices printed on the top and bottom rulers.
    pub labeled_columns: Vec<u32>,
    /// Row indices printed on the left and right rulers.
    pub labeled_rows: Vec<u32>,
}

/// Compute gridlines for a `grid`-sized chart.
///
/// Major lines and labels sit at `fabric_count, 2 * fabric_count, ...`
/// strictly inside the grid; the outer border is only a minor line.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a zero fabric count.
pub fn gridlines(grid: Dimensions, fabric_count: u32) -> Result<Gridlines, PipelineError> {
    check_fabric_count(fabric_count)?;
    let majors = |extent: u32| -> Vec<u32> {
        (1..)
            .map_while(|k: u32| k.checked_mul(fabric_count))
            .take_while(|&i| i < extent)
            .collect()
    };
    let major_columns = majors(grid.width);
    let major_rows = majors(grid.height);
    Ok(Gridlines {
        fabric_count,
        minor_columns: (0..=grid.width).collect(),
        minor_rows: (0..=grid.height).collect(),
        labeled_columns: major_columns.clone(),
        labeled_rows: major_rows.clone(),
        major_columns,
        major_rows,
    })
}

fn check_target(grid: Dimensions, width: f64, height: f64) -> Result<(), PipelineError> {
    if grid.width == 0 || grid.height == 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "grid must be at least 1x1, got {}x{}",
            grid.width, grid.height
        )));
    }
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(PipelineError::InvalidTarget(format!(
            "target must have positive area, got {width}x{height}"
        )));
    }
    Ok(())
}

fn check_fabric_count(fabric_count: u32) -> Result<(), PipelineError> {
    if fabric_count == 0 {
        return Err(PipelineError::InvalidConfig(
            "fabric count must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn margin_shifts_the_grid_and_grows_the_surface() {
        let t = stretch_to_target(dims(4, 2), 40.0, 20.0)
            .unwrap()
            .with_margin(5.0);
        assert!(close(t.width(), 50.0));
        assert!(close(t.height(), 30.0));
        assert!(close(t.column_x(0), 5.0));
        assert!(close(t.row_y(2), 25.0));
        assert!(close(t.content_width(), 40.0));
    }

    #[test]
    fn fit_wide_grid_into_square_letterboxes_vertically() {
        let t = fit_to_target(dims(20, 10), 400.0, 400.0).unwrap();
        assert!(close(t.cell_width(), 20.0));
        assert!(close(t.cell_height(), 20.0));
        assert!(close(t.offset_x(), 0.0));
        assert!(close(t.offset_y(), 100.0));
        assert!(close(t.content_height(), 200.0));
    }

    #[test]
    fn fit_tall_grid_letterboxes_horizontally() {
        let t = fit_to_target(dims(5, 10), 300.0, 200.0).unwrap();
        assert!(close(t.cell_width(), 20.0));
        assert!(close(t.offset_x(), 100.0));
        assert!(close(t.offset_y(), 0.0));
    }

    #[test]
    fn fit_keeps_cells_square() {
        let t = fit_to_target(dims(7, 3), 123.0, 457.0).unwrap();
        assert!(close(t.cell_width(), t.cell_height()));
        assert!(t.content_width() <= 123.0 + 1e-9);
        assert!(t.content_height() <= 457.0 + 1e-9);
    }

    #[test]
    fn stretch_fills_target() {
        let t = stretch_to_target(dims(4, 3), 100.0, 90.0).unwrap();
        assert!(close(t.cell_width(), 25.0));
        assert!(close(t.cell_height(), 30.0));
        assert!(close(t.stitch_size(), 25.0));
        assert_eq!(t.cell_center(1, 2), Point::new(37.5, 75.0));
    }

    #[test]
    fn zero_area_target_is_rejected() {
        for (w, h) in [(0.0, 10.0), (10.0, 0.0), (-5.0, 10.0), (f64::NAN, 1.0)] {
            assert!(
                matches!(
                    fit_to_target(dims(4, 4), w, h),
                    Err(PipelineError::InvalidTarget(_))
                ),
                "{w}x{h} accepted"
            );
        }
    }

    #[test]
    fn stretch_rejects_zero_area_too() {
        for (w, h) in [(0.0, 0.0), (40.0, 0.0), (f64::INFINITY, 10.0)] {
            assert!(matches!(
                stretch_to_target(dims(4, 4), w, h),
                Err(PipelineError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn bad_margins_leave_the_target_alone() {
        let t = stretch_to_target(dims(4, 2), 40.0, 20.0).unwrap();
        for margin in [-30.0, 0.0, f64::NAN, f64::NEG_INFINITY, f64::MAX] {
            assert_eq!(t.with_margin(margin), t);
        }
    }

    #[test]
    fn zero_grid_is_rejected() {
        assert!(matches!(
            fit_to_target(dims(0, 4), 10.0, 10.0),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn physical_fit_uses_fabric_count() {
        let t = fit_physical(dims(28, 14), 14, 300.0).unwrap();
        assert!(close(t.cell_width(), 300.0 / 14.0));
        assert!(close(t.width(), 600.0));
        assert!(close(t.height(), 300.0));
        assert_eq!(physical_size_inches(dims(28, 14), 14).unwrap(), (2.0, 1.0));
    }

    #[test]
    fn physical_fit_rejects_bad_inputs() {
        assert!(fit_physical(dims(4, 4), 0, 300.0).is_err());
        assert!(fit_physical(dims(4, 4), 14, 0.0).is_err());
    }

    #[test]
    fn gridlines_for_32_by_20_at_14_count() {
        let g = gridlines(dims(32, 20), 14).unwrap();
        assert_eq!(g.minor_columns.len(), 33);
        assert_eq!(g.minor_rows.len(), 21);
        assert_eq!(g.major_columns, vec![14, 28]);
        assert_eq!(g.major_rows, vec![14]);
        assert_eq!(g.labeled_columns, g.major_columns);
        assert_eq!(g.labeled_rows, g.major_rows);
    }

    #[test]
    fn gridlines_exclude_outer_border() {
        let g = gridlines(dims(28, 10), 14).unwrap();
        assert_eq!(g.major_columns, vec![14]);
        assert!(g.major_rows.is_empty());
    }

    #[test]
    fn gridlines_reject_zero_count() {
        assert!(matches!(
            gridlines(dims(10, 10), 0),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn gridline_positions_follow_target() {
        let t = fit_to_target(dims(20, 10), 400.0, 400.0).unwrap();
        assert!(close(t.column_x(14), 280.0));
        assert!(close(t.row_y(0), 100.0));
        assert!(close(t.row_y(10), 300.0));
    }

    #[test]
    fn fabric_count_parsing() {
        assert_eq!(parse_fabric_count("14-count").unwrap(), 14);
        assert_eq!(parse_fabric_count(" 18 count").unwrap(), 18);
        assert_eq!(parse_fabric_count("22").unwrap(), 22);
        assert!(parse_fabric_count("count").is_err());
        assert!(parse_fabric_count("0-count").is_err());
    }
}

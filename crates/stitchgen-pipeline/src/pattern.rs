//! The generated pattern and the render data derived from it.

use serde::{Deserialize, Serialize};

use crate::exterior::hole_count;
use crate::grid::{ExteriorMask, StitchGrid};
use crate::layout::{RenderTarget, stretch_to_target};
use crate::outline::{OutlinePath, OutlineStats, build_outline};
use crate::shapes::{Shapes, render};
use crate::types::{Dimensions, GenerationConfig};

/// Result of [`generate`](crate::generate): the stitch grid, its
/// exterior classification, and the configuration that produced them.
///
/// Render data (outline, shapes) is derived on demand for any
/// [`RenderTarget`], so one pattern can feed a screen preview, an SVG
/// download and a printed chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    grid: StitchGrid,
    exterior: ExteriorMask,
    config: GenerationConfig,
    source: Dimensions,
}

impl Pattern {
    pub(crate) const fn new(
        grid: StitchGrid,
        exterior: ExteriorMask,
        config: GenerationConfig,
        source: Dimensions,
    ) -> Self {
        Self {
            grid,
            exterior,
            config,
            source,
        }
    }

    /// The stitch grid.
    #[must_use]
    pub const fn grid(&self) -> &StitchGrid {
        &self.grid
    }

    /// The exterior mask of [`grid`](Self::grid).
    #[must_use]
    pub const fn exterior(&self) -> &ExteriorMask {
        &self.exterior
    }

    /// The configuration this pattern was generated with.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Size of the source image in pixels.
    #[must_use]
    pub const fn source_dimensions(&self) -> Dimensions {
        self.source
    }

    /// Grid size in stitches.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    /// Number of enclosed empty cells.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        hole_count(&self.grid, &self.exterior)
    }

    /// The inflated silhouette outline in `target` coordinates, in the
    /// thread color. Empty when the configured inflation is zero.
    #[must_use]
    pub fn outline(&self, target: &RenderTarget) -> OutlinePath {
        build_outline(
            &self.grid,
            &self.exterior,
            self.config.outline_inflation,
            self.config.thread_color,
            target,
        )
    }

    /// Fragment counts of the outline. They depend only on the grid, so
    /// any target gives the same numbers.
    #[must_use]
    pub fn outline_stats(&self) -> OutlineStats {
        let dims = self.dimensions();
        stretch_to_target(dims, f64::from(dims.width), f64::from(dims.height))
            .map(|target| self.outline(&target).stats())
            .unwrap_or_default()
    }

    /// Shape primitives for every stitch in `target` coordinates.
    #[must_use]
    pub fn shapes(&self, target: &RenderTarget) -> Shapes<'_> {
        render(&self.grid, &self.config, target)
    }
}

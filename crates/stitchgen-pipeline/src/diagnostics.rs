//! Generation diagnostics: timing and counts for each stage.
//!
//! Collected by [`generate_with_diagnostics`](crate::generate_with_diagnostics)
//! alongside the pattern itself.
//!
//! Duration measurements use [`std::time::Duration`] (platform-agnostic).
//! Timestamps are captured internally via the `web-time` crate, which
//! uses `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    /// Image decoding.
    pub decode: StageDiagnostics,
    /// Resampling and thresholding into the stitch grid.
    pub quantize: StageDiagnostics,
    /// Exterior flood fill.
    pub classify: StageDiagnostics,
    /// Outline construction. Skipped when inflation is zero.
    pub outline: Option<StageDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: GenerationSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Quantization metrics.
    Quantize {
        /// Resampling filter name.
        filter: String,
        /// Luminance threshold.
        threshold: u8,
        /// Grid columns.
        grid_width: u32,
        /// Grid rows.
        grid_height: u32,
        /// Stitched cells.
        occupied_count: usize,
    },
    /// Exterior classification metrics.
    Classify {
        /// Empty cells connected to the border.
        exterior_count: usize,
        /// Enclosed empty cells.
        hole_count: usize,
    },
    /// Outline construction metrics.
    Outline {
        /// Inflation distance in output units.
        inflation: f64,
        /// Straight segments.
        straight: usize,
        /// Convex corner arcs.
        convex_arcs: usize,
        /// Concave corner arcs.
        concave_arcs: usize,
    },
}

/// High-level summary counts for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Grid columns.
    pub grid_width: u32,
    /// Grid rows.
    pub grid_height: u32,
    /// Stitched cells.
    pub occupied_count: usize,
    /// Enclosed empty cells.
    pub hole_count: usize,
    /// Outline fragments (zero when the outline is disabled).
    pub outline_fragments: usize,
}

impl GenerationDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Generation Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}  ->  Grid: {}x{}",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.grid_width,
            self.summary.grid_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![
            ("Decode", &self.decode),
            ("Quantize", &self.quantize),
            ("Classify", &self.classify),
        ];
        if let Some(ref outline) = self.outline {
            stages.push(("Outline", outline));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Stitches: {}  |  Holes: {}  |  Outline fragments: {}",
            self.summary.occupied_count, self.summary.hole_count, self.summary.outline_fragments,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Quantize {
            filter,
            threshold,
            grid_width,
            grid_height,
            occupied_count,
        } => {
            let cells = u64::from(*grid_width) * u64::from(*grid_height);
            #[allow(clippy::cast_precision_loss)]
            let density = if cells > 0 {
                *occupied_count as f64 / cells as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "{filter} t={threshold} {grid_width}x{grid_height} stitches={occupied_count} ({density:.1}%)",
            )
        }
        StageMetrics::Classify {
            exterior_count,
            hole_count,
        } => format!("exterior={exterior_count} holes={hole_count}"),
        StageMetrics::Outline {
            inflation,
            straight,
            convex_arcs,
            concave_arcs,
        } => format!(
            "o={inflation:.2} straight={straight} convex={convex_arcs} concave={concave_arcs}",
        ),
    }
}

//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! [`process_staged_with_diagnostics`] steps a [`Stage`] through the
//! pipeline, timing every transition with a caller-supplied [`Clock`].
//! The pipeline crate never reads the system clock itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::edge::EdgePolarity;
use crate::glyph::AsciiFrame;
use crate::pipeline::{Pipeline, STAGE_COUNT, Stage};
use crate::types::{GrayImage, PipelineConfig, PipelineError, StagedResult};

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

/// Source of timestamps for stage timing.
///
/// Native callers back this with `std::time::Instant`; tests use a
/// deterministic fake.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from converting a single frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    /// One entry per transition, in pipeline order: decode, edges,
    /// resample, glyphs.
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: FrameSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Name of the state the transition produced (see [`Stage::name`]).
    pub stage: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Edge extraction metrics.
    EdgeExtraction {
        /// Which kernel was applied.
        kernel: String,
        /// Which polarity was applied.
        polarity: String,
        /// Cropped width in pixels.
        width: u32,
        /// Cropped height in pixels.
        height: u32,
        /// Pixels whose edge strength is at least half scale.
        strong_edge_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Resample metrics.
    Resample {
        /// Edge image width.
        source_width: u32,
        /// Edge image height.
        source_height: u32,
        /// Output columns.
        width: u32,
        /// Output rows.
        height: u32,
        /// Aspect correction factor.
        width_scale: f64,
        /// Which filter was used.
        filter: String,
    },
    /// Glyph mapping metrics.
    GlyphMapping {
        /// Number of glyphs in the ramp.
        ramp_len: usize,
        /// Characters per line.
        columns: u32,
        /// Number of lines.
        rows: usize,
        /// How many different ramp glyphs appear in the frame.
        distinct_glyphs: usize,
    },
}

/// High-level summary for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total source pixel count.
    pub pixel_count: u64,
    /// Characters per output line.
    pub columns: u32,
    /// Number of output lines.
    pub rows: usize,
}

/// Run the pipeline with per-stage timing.
///
/// Produces the same [`StagedResult`] as [`crate::process_staged`]
/// together with a [`FrameDiagnostics`] record.
///
/// # Errors
///
/// Returns [`PipelineError`] from whichever stage fails; no partial
/// diagnostics are returned.
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: Vec<u8>,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, FrameDiagnostics), PipelineError> {
    let total_start = clock.now();

    let mut stage = Stage::from(Pipeline::new(image_bytes, config.clone()));
    let mut stages = Vec::with_capacity(STAGE_COUNT - 1);
    while !stage.is_complete() {
        let start = clock.now();
        stage = stage.advance()?;
        let duration = clock.elapsed(&start);
        if let Some(metrics) = stage.metrics() {
            stages.push(StageDiagnostics {
                stage: stage.name().to_string(),
                duration,
                metrics,
            });
        }
    }

    let total_duration = clock.elapsed(&total_start);
    let result = stage.finish()?;
    let summary = FrameSummary {
        image_width: result.dimensions.width,
        image_height: result.dimensions.height,
        pixel_count: result.dimensions.pixel_count(),
        columns: result.frame.width(),
        rows: result.frame.height(),
    };

    Ok((
        result,
        FrameDiagnostics {
            stages,
            total_duration,
            summary,
        },
    ))
}

impl FrameDiagnostics {
    /// Diagnostics for the transition that produced `stage`, if it ran.
    #[must_use]
    pub fn stage(&self, stage: &str) -> Option<&StageDiagnostics> {
        self.stages.iter().find(|d| d.stage == stage)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Frame Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<18} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for diag in &self.stages {
            let name = metrics_label(&diag.metrics);
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<18} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Output: {} columns x {} rows",
            self.summary.columns, self.summary.rows,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Report label for the stage that produced `metrics`.
const fn metrics_label(metrics: &StageMetrics) -> &'static str {
    match metrics {
        StageMetrics::Decode { .. } => "Decode",
        StageMetrics::EdgeExtraction { .. } => "Edge Extraction",
        StageMetrics::Resample { .. } => "Resample",
        StageMetrics::GlyphMapping { .. } => "Glyph Mapping",
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::EdgeExtraction {
            kernel,
            polarity,
            width,
            height,
            strong_edge_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *strong_edge_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "{kernel} {polarity} {width}x{height} strong={strong_edge_count} ({density:.1}%)",
            )
        }
        StageMetrics::Resample {
            source_width,
            source_height,
            width,
            height,
            width_scale,
            filter,
        } => format!(
            "{filter} {source_width}x{source_height} -> {width}x{height} (scale={width_scale:.2})",
        ),
        StageMetrics::GlyphMapping {
            ramp_len,
            columns,
            rows,
            distinct_glyphs,
        } => format!("{columns}x{rows} chars, {distinct_glyphs}/{ramp_len} glyphs used"),
    }
}

/// Count pixels whose edge strength is at least half scale, undoing
/// `polarity` so the count is comparable across polarities.
pub(crate) fn count_strong_edges(edges: &GrayImage, polarity: EdgePolarity) -> u64 {
    edges
        .pixels()
        .map(|p| {
            let strength = match polarity {
                EdgePolarity::DarkEdges => !p.0[0],
                EdgePolarity::LightEdges => p.0[0],
            };
            u64::from(u8::from(strength >= 128))
        })
        .sum()
}

/// Number of distinct glyphs appearing anywhere in `frame`.
pub(crate) fn count_distinct_glyphs(frame: &AsciiFrame) -> usize {
    frame
        .lines()
        .iter()
        .flat_map(|line| line.chars())
        .collect::<BTreeSet<char>>()
        .len()
}

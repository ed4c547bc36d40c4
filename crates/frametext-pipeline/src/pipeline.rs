//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use frametext_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::new(png, config)
//!     .decode()?
//!     .extract_edges()?
//!     .resample()?
//!     .map_glyphs();
//!
//! let staged = pipeline.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. The caller can inspect the current stage's output via
//! accessor methods at any point.
//!
//! The configuration is validated when leaving [`Pending`], before the
//! source bytes are touched.

use crate::diagnostics::StageMetrics;
use crate::glyph::AsciiFrame;
use crate::types::{Dimensions, GrayImage, PipelineConfig, PipelineError, StagedResult};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image bytes and config are stored but not yet touched.
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing, call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate the config, decode the source image, and advance to
    /// the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the config fails
    /// validation. Returns [`PipelineError::EmptyInput`] if the source
    /// bytes are empty. Returns [`PipelineError::ImageDecode`] if the
    /// image format is unrecognized or the data is corrupt.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let luminance = crate::grayscale::decode_luminance(&self.source)?;
        Ok(Decoded {
            config: self.config,
            dimensions: Dimensions::of(&luminance),
            luminance,
            source_len: self.source.len(),
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image to luminance.
///
/// Call [`extract_edges`](Self::extract_edges) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .extract_edges() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    luminance: GrayImage,
    dimensions: Dimensions,
    source_len: usize,
}

impl Decoded {
    /// The decoded luminance image.
    #[must_use]
    pub const fn luminance(&self) -> &GrayImage {
        &self.luminance
    }

    /// Source image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Advance to the edge extraction stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if the image is too
    /// small to crop (either side 2 pixels or less).
    pub fn extract_edges(self) -> Result<EdgesExtracted, PipelineError> {
        let edges = crate::edge::extract_edges(
            &self.luminance,
            self.config.edge_kernel,
            self.config.polarity,
        )?;
        Ok(EdgesExtracted {
            config: self.config,
            luminance: self.luminance,
            edges,
            dimensions: self.dimensions,
        })
    }

    pub(crate) fn collect_metrics(&self) -> StageMetrics {
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width: self.dimensions.width,
            height: self.dimensions.height,
            pixel_count: self.dimensions.pixel_count(),
        }
    }
}

// ───────────────────────── Stage 2: EdgesExtracted ───────────────────

/// Pipeline state after edge filtering, polarity, and border crop.
///
/// Call [`resample`](Self::resample) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .resample() to continue"]
pub struct EdgesExtracted {
    config: PipelineConfig,
    luminance: GrayImage,
    edges: GrayImage,
    dimensions: Dimensions,
}

impl EdgesExtracted {
    /// The cropped, polarity-adjusted edge image.
    #[must_use]
    pub const fn edges(&self) -> &GrayImage {
        &self.edges
    }

    /// Advance to the resample stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if the target
    /// height computes to zero.
    pub fn resample(self) -> Result<Resampled, PipelineError> {
        let resampled = crate::resample::resample(
            &self.edges,
            self.config.width,
            self.config.width_scale,
            self.config.resample_filter,
        )?;
        Ok(Resampled {
            config: self.config,
            luminance: self.luminance,
            edges: self.edges,
            resampled,
            dimensions: self.dimensions,
        })
    }

    pub(crate) fn collect_metrics(&self) -> StageMetrics {
        StageMetrics::EdgeExtraction {
            kernel: self.config.edge_kernel.to_string(),
            polarity: self.config.polarity.to_string(),
            width: self.edges.width(),
            height: self.edges.height(),
            strong_edge_count: crate::diagnostics::count_strong_edges(
                &self.edges,
                self.config.polarity,
            ),
            total_pixel_count: Dimensions::of(&self.edges).pixel_count(),
        }
    }
}

// ───────────────────────── Stage 3: Resampled ────────────────────────

/// Pipeline state after resampling to the character grid.
///
/// Call [`map_glyphs`](Self::map_glyphs) to advance to the final stage.
#[must_use = "pipeline stages are consumed by advancing, call .map_glyphs() to continue"]
pub struct Resampled {
    config: PipelineConfig,
    luminance: GrayImage,
    edges: GrayImage,
    resampled: GrayImage,
    dimensions: Dimensions,
}

impl Resampled {
    /// The resampled image, one sample per output character.
    #[must_use]
    pub const fn resampled(&self) -> &GrayImage {
        &self.resampled
    }

    /// Advance to the glyph mapping stage, the final pipeline step.
    pub fn map_glyphs(self) -> Mapped {
        let frame = AsciiFrame::render(&self.resampled, &self.config.ramp);
        Mapped {
            config: self.config,
            luminance: self.luminance,
            edges: self.edges,
            resampled: self.resampled,
            frame,
            dimensions: self.dimensions,
        }
    }

    pub(crate) fn collect_metrics(&self) -> StageMetrics {
        StageMetrics::Resample {
            source_width: self.edges.width(),
            source_height: self.edges.height(),
            width: self.resampled.width(),
            height: self.resampled.height(),
            width_scale: self.config.width_scale,
            filter: self.config.resample_filter.to_string(),
        }
    }
}

// ───────────────────────── Stage 4: Mapped ───────────────────────────

/// Pipeline state after glyph mapping: the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`] containing all intermediates.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Mapped {
    config: PipelineConfig,
    luminance: GrayImage,
    edges: GrayImage,
    resampled: GrayImage,
    frame: AsciiFrame,
    dimensions: Dimensions,
}

impl Mapped {
    /// The rendered ASCII frame.
    #[must_use]
    pub const fn frame(&self) -> &AsciiFrame {
        &self.frame
    }

    /// Source image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            luminance: self.luminance,
            edges: self.edges,
            resampled: self.resampled,
            frame: self.frame,
            dimensions: self.dimensions,
        }
    }

    pub(crate) fn collect_metrics(&self) -> StageMetrics {
        StageMetrics::GlyphMapping {
            ramp_len: self.config.ramp.len(),
            columns: self.frame.width(),
            rows: self.frame.height(),
            distinct_glyphs: crate::diagnostics::count_distinct_glyphs(&self.frame),
        }
    }
}

// ───────────────────────── Stage: any state ──────────────────────────

/// Number of pipeline states, [`Pending`] through [`Mapped`].
pub const STAGE_COUNT: usize = 5;

/// Any pipeline state, for drivers that step through the pipeline in a
/// loop instead of chaining the typed methods.
///
/// [`process_staged_with_diagnostics`](crate::diagnostics::process_staged_with_diagnostics)
/// drives one of these, timing each [`advance`](Self::advance) and
/// reading [`metrics`](Self::metrics) afterwards:
///
/// ```rust
/// # use frametext_pipeline::{Pipeline, PipelineConfig, PipelineError};
/// # use frametext_pipeline::pipeline::Stage;
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage = Stage::from(Pipeline::new(png, PipelineConfig::default()));
/// while !stage.is_complete() {
///     stage = stage.advance()?;
///     assert!(stage.metrics().is_some());
/// }
/// let result = stage.finish()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`EdgesExtracted`].
    EdgesExtracted(EdgesExtracted),
    /// See [`Resampled`].
    Resampled(Resampled),
    /// See [`Mapped`].
    Mapped(Mapped),
}

impl Stage {
    /// Short name of the state: `"source"`, `"decode"`, `"edges"`,
    /// `"resample"` or `"glyphs"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending(_) => "source",
            Self::Decoded(_) => "decode",
            Self::EdgesExtracted(_) => "edges",
            Self::Resampled(_) => "resample",
            Self::Mapped(_) => "glyphs",
        }
    }

    /// Zero-based position in the pipeline.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Pending(_) => 0,
            Self::Decoded(_) => 1,
            Self::EdgesExtracted(_) => 2,
            Self::Resampled(_) => 3,
            Self::Mapped(_) => 4,
        }
    }

    /// Metrics for the work that produced this state. `None` for
    /// [`Pending`], which has done nothing yet.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        match self {
            Self::Pending(_) => None,
            Self::Decoded(s) => Some(s.collect_metrics()),
            Self::EdgesExtracted(s) => Some(s.collect_metrics()),
            Self::Resampled(s) => Some(s.collect_metrics()),
            Self::Mapped(s) => Some(s.collect_metrics()),
        }
    }

    /// Whether the final state has been reached.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Run the next transition. [`Mapped`] is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the transition fails.
    pub fn advance(self) -> Result<Self, PipelineError> {
        Ok(match self {
            Self::Pending(s) => Self::Decoded(s.decode()?),
            Self::Decoded(s) => Self::EdgesExtracted(s.extract_edges()?),
            Self::EdgesExtracted(s) => Self::Resampled(s.resample()?),
            Self::Resampled(s) => Self::Mapped(s.map_glyphs()),
            done @ Self::Mapped(_) => done,
        })
    }

    /// Run every remaining transition and return the [`StagedResult`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] from the first transition that fails.
    pub fn finish(mut self) -> Result<StagedResult, PipelineError> {
        loop {
            self = match self {
                Self::Mapped(mapped) => return Ok(mapped.into_result()),
                other => other.advance()?,
            };
        }
    }
}

impl From<Pending> for Stage {
    fn from(s: Pending) -> Self {
        Self::Pending(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental frame conversion pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. The caller then chains stage
/// methods:
///
/// ```rust
/// # use frametext_pipeline::{Pipeline, PipelineConfig, PipelineError};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let result = Pipeline::new(png, PipelineConfig::default())
///     .decode()?
///     .extract_edges()?
///     .resample()?
///     .map_glyphs()
///     .into_result();
/// # Ok(())
/// # }
/// ```
///
/// Each stage method consumes the current state and returns the next,
/// so skipping a stage or running them out of order does not compile.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// Nothing is validated or decoded until
    /// [`.decode()`](Pending::decode) is called.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}

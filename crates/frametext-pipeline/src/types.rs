//! Shared types for the frametext conversion pipeline.

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeKernel, EdgePolarity};
use crate::glyph::{AsciiFrame, GlyphRamp};
use crate::resample::ResampleFilter;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of a grayscale image.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Configuration for the conversion pipeline.
///
/// Passed explicitly into every pipeline entry point. Missing fields
/// fall back to their defaults when deserializing, so a partial JSON
/// object such as `{"width": 80}` is a valid configuration.
///
/// Field invariants are checked by [`validate`](Self::validate), which
/// every entry point calls before doing any work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target output width in characters.
    pub width: u32,

    /// Width/height correction applied when computing the output
    /// height. Character cells are taller than they are wide, so the
    /// default of 0.5 halves the row count.
    ///
    /// Must be finite and strictly positive.
    pub width_scale: f64,

    /// Glyphs ordered from darkest to lightest.
    pub ramp: GlyphRamp,

    /// Whether edges render dark on light or light on dark.
    pub polarity: EdgePolarity,

    /// Which 3x3 convolution kernel detects edges.
    pub edge_kernel: EdgeKernel,

    /// Resampling policy used when shrinking to the character grid.
    pub resample_filter: ResampleFilter,
}

impl PipelineConfig {
    /// Default output width in characters.
    pub const DEFAULT_WIDTH: u32 = 25;
    /// Default character-cell aspect correction.
    pub const DEFAULT_WIDTH_SCALE: f64 = 0.5;
    /// Default dark-to-light glyph ramp.
    pub const DEFAULT_RAMP: &'static str = GlyphRamp::STANDARD;
    /// Default edge polarity.
    pub const DEFAULT_POLARITY: EdgePolarity = EdgePolarity::DarkEdges;
    /// Default edge-detection kernel.
    pub const DEFAULT_EDGE_KERNEL: EdgeKernel = EdgeKernel::FindEdges;
    /// Default resampling filter.
    pub const DEFAULT_RESAMPLE_FILTER: ResampleFilter = ResampleFilter::Box;

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `width_scale` is not
    /// a finite, strictly positive number or the ramp is empty. A zero
    /// `width` is reported by the resample stage as
    /// [`PipelineError::InvalidDimensions`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.width_scale.is_finite() || self.width_scale <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "width_scale must be finite and positive, got {}",
                self.width_scale,
            )));
        }
        if self.ramp.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "glyph ramp must contain at least one character".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            width_scale: Self::DEFAULT_WIDTH_SCALE,
            ramp: GlyphRamp::default(),
            polarity: Self::DEFAULT_POLARITY,
            edge_kernel: Self::DEFAULT_EDGE_KERNEL,
            resample_filter: Self::DEFAULT_RESAMPLE_FILTER,
        }
    }
}

/// Result of running the pipeline with every intermediate preserved.
///
/// The batch driver uses `edges` to persist the optional
/// `edges_<name>` inspection image; everything else is available for
/// diagnostics and tests.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 1: decoded luminance image.
    pub luminance: GrayImage,
    /// Stage 2: polarity-adjusted edge image, border already cropped.
    pub edges: GrayImage,
    /// Stage 3: edge image resampled to the character grid.
    pub resampled: GrayImage,
    /// Stage 4: the rendered ASCII frame.
    pub frame: AsciiFrame,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// An image or target size is too small for the requested stage.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Offending width.
        width: u32,
        /// Offending height.
        height: u32,
        /// Which constraint was violated.
        reason: &'static str,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.width, 25);
        assert!((config.width_scale - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.ramp.to_string(), "@%#*+=-:. ");
        assert_eq!(config.ramp.len(), 10);
        assert_eq!(config.polarity, EdgePolarity::DarkEdges);
        assert_eq!(config.edge_kernel, EdgeKernel::FindEdges);
        assert_eq!(config.resample_filter, ResampleFilter::Box);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_width_scale_is_rejected() {
        let config = PipelineConfig {
            width_scale: 0.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_and_nan_width_scale_are_rejected() {
        for width_scale in [-0.5, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                width_scale,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(PipelineError::InvalidConfig(_))),
                "width_scale={width_scale} should be rejected",
            );
        }
    }

    #[test]
    fn dimensions_of_image() {
        let img = GrayImage::new(7, 3);
        let d = Dimensions::of(&img);
        assert_eq!(
            d,
            Dimensions {
                width: 7,
                height: 3
            }
        );
        assert_eq!(d.pixel_count(), 21);
    }

    // --- PipelineError tests ---

    #[test]
    fn error_empty_input_display() {
        let err = PipelineError::EmptyInput;
        assert_eq!(err.to_string(), "input image data is empty");
    }

    #[test]
    fn error_invalid_dimensions_display() {
        let err = PipelineError::InvalidDimensions {
            width: 2,
            height: 9,
            reason: "too small to crop",
        };
        assert_eq!(err.to_string(), "invalid dimensions 2x9: too small to crop");
    }

    #[test]
    fn error_invalid_config_display() {
        let err = PipelineError::InvalidConfig("empty ramp".to_string());
        assert_eq!(
            err.to_string(),
            "invalid pipeline configuration: empty ramp"
        );
    }

    // --- Serde ---

    #[test]
    fn pipeline_config_serde_round_trip() {
        let config = PipelineConfig {
            width: 80,
            width_scale: 0.45,
            ramp: GlyphRamp::new("#. ").unwrap(),
            polarity: EdgePolarity::LightEdges,
            edge_kernel: EdgeKernel::Sobel,
            resample_filter: ResampleFilter::Lanczos3,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"width": 40}"#).unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.ramp, GlyphRamp::default());
        assert_eq!(config.resample_filter, ResampleFilter::Box);
    }

    #[test]
    fn control_character_ramp_in_json_is_rejected() {
        let result: Result<PipelineConfig, _> = serde_json::from_str(r#"{"ramp": "@\n"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_ramp_in_json_is_rejected() {
        let result: Result<PipelineConfig, _> = serde_json::from_str(r#"{"ramp": ""}"#);
        assert!(result.is_err());
    }
}

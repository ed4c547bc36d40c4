//! frametext-pipeline: Pure frame-to-ASCII conversion pipeline (sans-IO).
//!
//! Converts one raster frame into fixed-width lines of text through:
//! decode to luminance -> edge filter + polarity + border crop ->
//! resample to the character grid -> glyph mapping.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! byte slices and images and returns structured data. All filesystem
//! interaction lives in `frametext-io`.

pub mod diagnostics;
pub mod edge;
pub mod glyph;
pub mod grayscale;
pub mod pipeline;
pub mod resample;
pub mod types;

pub use edge::{EdgeKernel, EdgePolarity, extract_edges};
pub use glyph::{AsciiFrame, GlyphRamp};
pub use grayscale::decode_luminance;
pub use pipeline::Pipeline;
pub use resample::{ResampleFilter, resample, target_height};
pub use types::{Dimensions, GrayImage, PipelineConfig, PipelineError, StagedResult};

/// Convert an already-decoded luminance image into an ASCII frame.
///
/// Runs edge extraction, resampling, and glyph mapping. The input is
/// not modified.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation, and [`PipelineError::InvalidDimensions`] if the image is
/// too small to crop or the computed output height is zero.
pub fn convert(luminance: &GrayImage, config: &PipelineConfig) -> Result<AsciiFrame, PipelineError> {
    config.validate()?;
    let edges = edge::extract_edges(luminance, config.edge_kernel, config.polarity)?;
    let resampled = resample::resample(
        &edges,
        config.width,
        config.width_scale,
        config.resample_filter,
    )?;
    Ok(AsciiFrame::render(&resampled, &config.ramp))
}

/// Run the full conversion pipeline on encoded image bytes.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// and produces the [`AsciiFrame`] for that image.
///
/// # Pipeline steps
///
/// 1. Decode and convert to luminance
/// 2. Edge filter, polarity, 1-pixel border crop
/// 3. Resample to `width` columns with aspect correction
/// 4. Map each sample to a ramp glyph
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::InvalidDimensions`] if the image is too small.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<AsciiFrame, PipelineError> {
    config.validate()?;
    let luminance = grayscale::decode_luminance(image_bytes)?;
    convert(&luminance, config)
}

/// Run the full pipeline and keep every intermediate.
///
/// Produces the same result as driving a [`Pipeline`] through all
/// stages, without taking ownership of the encoded bytes. Callers that
/// need the edge image (for example to save an inspection artifact) use
/// this instead of [`process`].
///
/// # Errors
///
/// Same conditions as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    config.validate()?;
    let luminance = grayscale::decode_luminance(image_bytes)?;
    let edges = edge::extract_edges(&luminance, config.edge_kernel, config.polarity)?;
    let resampled = resample::resample(
        &edges,
        config.width,
        config.width_scale,
        config.resample_filter,
    )?;
    let frame = AsciiFrame::render(&resampled, &config.ramp);
    Ok(StagedResult {
        dimensions: Dimensions::of(&luminance),
        luminance,
        edges,
        resampled,
        frame,
    })
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{sharp_edge_png, uniform_png};

    #[test]
    fn process_empty_input() {
        let result = process(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_rejects_invalid_config() {
        let config = PipelineConfig {
            width_scale: f64::NAN,
            ..PipelineConfig::default()
        };
        let result = process(&sharp_edge_png(40, 40), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn zero_width_is_a_dimension_error() {
        let config = PipelineConfig {
            width: 0,
            ..PipelineConfig::default()
        };
        let result = process(&sharp_edge_png(40, 40), &config);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn uniform_white_maps_to_lightest_glyph() {
        let png = uniform_png(27, 27, 255);
        let frame = process(&png, &PipelineConfig::default()).unwrap();

        // 25x25 after crop: H = round(25 * 25 * 0.5 / 25) = 13.
        assert_eq!(frame.height(), 13);
        for line in frame.lines() {
            assert_eq!(line, &" ".repeat(25));
        }
    }

    #[test]
    fn uniform_image_has_no_edges_at_any_gray_level() {
        for value in [0, 64, 200] {
            let frame = process(&uniform_png(30, 30, value), &PipelineConfig::default()).unwrap();
            assert!(
                frame.lines().iter().all(|l| l.chars().all(|c| c == ' ')),
                "gray level {value} produced edges",
            );
        }
    }

    #[test]
    fn light_edges_on_uniform_image_is_darkest_glyph() {
        let config = PipelineConfig {
            polarity: EdgePolarity::LightEdges,
            ..PipelineConfig::default()
        };
        let frame = process(&uniform_png(27, 27, 255), &config).unwrap();
        assert!(frame.lines().iter().all(|l| l.chars().all(|c| c == '@')));
    }

    #[test]
    fn frame_dimensions_follow_width_and_scale() {
        let png = sharp_edge_png(100, 100);
        let frame = process(&png, &PipelineConfig::default()).unwrap();
        assert_eq!(frame.width(), 25);
        assert_eq!(frame.height(), 13);
        for line in frame.lines() {
            assert_eq!(line.chars().count(), 25);
        }

        let wide = PipelineConfig {
            width: 80,
            width_scale: 0.45,
            ..PipelineConfig::default()
        };
        // 98 * 80 * 0.45 / 98 = 36
        let frame = process(&png, &wide).unwrap();
        assert_eq!(frame.height(), 36);
        assert!(frame.lines().iter().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn sharp_boundary_draws_dark_glyphs() {
        let frame = process(&sharp_edge_png(100, 100), &PipelineConfig::default()).unwrap();
        let text = frame.to_text();
        assert!(
            text.chars().any(|c| c != ' ' && c != '\n'),
            "expected an edge stroke, got:\n{text}",
        );
        // Far from the boundary nothing is drawn.
        for line in frame.lines() {
            assert!(line.starts_with("     "));
            assert!(line.ends_with("     "));
        }
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let png = sharp_edge_png(64, 48);
        let config = PipelineConfig::default();
        let first = process(&png, &config).unwrap().to_text();
        for _ in 0..3 {
            assert_eq!(process(&png, &config).unwrap().to_text(), first);
        }
    }

    #[test]
    fn convert_matches_process() {
        let png = sharp_edge_png(64, 48);
        let config = PipelineConfig::default();
        let gray = decode_luminance(&png).unwrap();
        assert_eq!(
            convert(&gray, &config).unwrap(),
            process(&png, &config).unwrap()
        );
    }

    #[test]
    fn convert_leaves_input_untouched() {
        let gray = decode_luminance(&sharp_edge_png(40, 40)).unwrap();
        let before = gray.clone();
        let _ = convert(&gray, &PipelineConfig::default()).unwrap();
        assert_eq!(gray, before);
    }

    #[test]
    fn process_staged_keeps_intermediates() {
        let staged = process_staged(&sharp_edge_png(50, 30), &PipelineConfig::default()).unwrap();
        assert_eq!(staged.luminance.dimensions(), (50, 30));
        assert_eq!(staged.edges.dimensions(), (48, 28));
        assert_eq!(staged.resampled.dimensions(), (25, 7));
        assert_eq!(staged.frame.height(), 7);
    }

    #[test]
    fn tiny_image_is_rejected() {
        let result = process(&uniform_png(2, 2, 0), &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::InvalidDimensions { .. })
        ));
    }
}

//! Image decoding and luminance conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a
//! single-channel luminance image. This is the first pipeline stage:
//! raw bytes in, `GrayImage` out.

use image::GrayImage;

use crate::types::PipelineError;

/// Decode raw image bytes and convert to single-channel luminance.
///
/// Supports whatever formats the `image` crate was built with (PNG,
/// JPEG, BMP, WebP). Color input is reduced with the `image` crate's
/// weighted luma conversion, so green contributes more than red and
/// red more than blue.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_luminance(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{encode_png, encode_rgba_pixel};

    #[test]
    fn empty_input_returns_error() {
        let result = decode_luminance(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_luminance(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn white_png_decodes_to_full_luminance() {
        let png = encode_png(&image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([255, 255, 255, 255]),
        ));

        let gray = decode_luminance(&png).unwrap();
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn output_dimensions_match_input() {
        let png = encode_png(&image::RgbaImage::from_pixel(
            17,
            31,
            image::Rgba([128, 64, 32, 255]),
        ));

        let gray = decode_luminance(&png).unwrap();
        assert_eq!(gray.width(), 17);
        assert_eq!(gray.height(), 31);
    }

    #[test]
    fn conversion_is_weighted_luminance() {
        let r_val = decode_luminance(&encode_rgba_pixel(255, 0, 0))
            .unwrap()
            .get_pixel(0, 0)
            .0[0];
        let g_val = decode_luminance(&encode_rgba_pixel(0, 255, 0))
            .unwrap()
            .get_pixel(0, 0)
            .0[0];
        let b_val = decode_luminance(&encode_rgba_pixel(0, 0, 255))
            .unwrap()
            .get_pixel(0, 0)
            .0[0];

        assert!(
            g_val > r_val && r_val > b_val,
            "expected green > red > blue luminance, got R={r_val} G={g_val} B={b_val}",
        );
    }
}

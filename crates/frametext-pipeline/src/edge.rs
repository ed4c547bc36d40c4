//! Edge extraction: convolution, polarity, and border crop.
//!
//! A fixed 3x3 kernel is convolved over the luminance image with
//! [`imageproc::filter::filter_clamped`]. The response magnitude is
//! clamped to `0..=255`, optionally inverted so edges render as dark
//! strokes on a light background, and finally the outermost 1-pixel
//! ring is cropped away. That ring is where the kernel overhangs the
//! image and `imageproc` substitutes clamped border pixels, so its
//! values are artifacts rather than real gradients.
//!
//! The output is always exactly two pixels narrower and two pixels
//! shorter than the input.

use std::fmt;

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::filter_clamped;
use imageproc::kernel::{self, Kernel};
use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// 8-neighbour Laplacian: responds to any local intensity change,
/// regardless of direction.
///
/// The strength is the absolute response, so a step edge marks the
/// pixels on both sides of it. Clamping negative responses to zero
/// instead would only mark the brighter side.
const FIND_EDGES_3X3: [i32; 9] = [-1, -1, -1, -1, 8, -1, -1, -1, -1];

/// Convolution kernel used to detect edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeKernel {
    /// 8-neighbour Laplacian, `|response|` clamped to 255.
    #[default]
    FindEdges,
    /// Sobel gradient magnitude `hypot(gx, gy)` clamped to 255.
    Sobel,
}

impl fmt::Display for EdgeKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindEdges => f.write_str("FindEdges"),
            Self::Sobel => f.write_str("Sobel"),
        }
    }
}

/// How filtered edge strength maps onto output luminance.
///
/// With the default dark-to-light glyph ramp, [`DarkEdges`](Self::DarkEdges)
/// draws edges with the densest glyphs on a blank background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolarity {
    /// `output = 255 - strength`: strong edges become dark.
    #[default]
    DarkEdges,
    /// `output = strength`: strong edges stay bright.
    LightEdges,
}

impl fmt::Display for EdgePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DarkEdges => f.write_str("DarkEdges"),
            Self::LightEdges => f.write_str("LightEdges"),
        }
    }
}

/// Run the full edge extraction stage.
///
/// Filters `image` with `kernel`, applies `polarity`, and crops the
/// 1-pixel border. The result has dimensions `(width - 2, height - 2)`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] if either dimension is
/// 2 or less, since the crop would leave an empty image.
pub fn extract_edges(
    image: &GrayImage,
    kernel: EdgeKernel,
    polarity: EdgePolarity,
) -> Result<GrayImage, PipelineError> {
    let (w, h) = image.dimensions();
    if w <= 2 || h <= 2 {
        return Err(PipelineError::InvalidDimensions {
            width: w,
            height: h,
            reason: "edge extraction needs at least 3x3 pixels",
        });
    }

    let strength = edge_strength(image, kernel);
    let adjusted = match polarity {
        EdgePolarity::DarkEdges => invert(&strength),
        EdgePolarity::LightEdges => strength,
    };
    Ok(crop_border(&adjusted))
}

/// Per-pixel edge strength in `0..=255`, same dimensions as the input.
#[must_use = "returns the edge strength image"]
pub fn edge_strength(image: &GrayImage, kind: EdgeKernel) -> GrayImage {
    match kind {
        EdgeKernel::FindEdges => {
            let response: Image<Luma<i16>> =
                filter_clamped(image, Kernel::new(&FIND_EDGES_3X3, 3, 3));
            GrayImage::from_fn(image.width(), image.height(), |x, y| {
                Luma([clamp_to_u8(f32::from(response.get_pixel(x, y).0[0].unsigned_abs()))])
            })
        }
        EdgeKernel::Sobel => {
            let gx: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_HORIZONTAL_3X3);
            let gy: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_VERTICAL_3X3);
            GrayImage::from_fn(image.width(), image.height(), |x, y| {
                let h = f32::from(gx.get_pixel(x, y).0[0]);
                let v = f32::from(gy.get_pixel(x, y).0[0]);
                Luma([clamp_to_u8(h.hypot(v))])
            })
        }
    }
}

/// Invert luminance: `255 - value` for every pixel.
#[must_use = "returns the inverted image"]
pub fn invert(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([!image.get_pixel(x, y).0[0]])
    })
}

/// Drop the outermost 1-pixel ring.
///
/// Callers must ensure both dimensions exceed 2.
fn crop_border(image: &GrayImage) -> GrayImage {
    let (w, h) = image.dimensions();
    image::imageops::crop_imm(image, 1, 1, w - 2, h - 2).to_image()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

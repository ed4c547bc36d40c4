//! Resampling the edge image down to the character grid.
//!
//! The output width is the configured character count `W`. The output
//! height follows the source aspect ratio, scaled by `width_scale` to
//! compensate for character cells being taller than they are wide:
//!
//! ```text
//! H = round(source_height * W * width_scale / source_width)
//! ```
//!
//! The default policy is a box average: every output sample is the
//! rounded mean of the source pixels in its footprint. The `image`
//! crate's interpolating filters are available as alternatives.

use std::fmt;

use image::GrayImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// Resampling policy used when shrinking to the character grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleFilter {
    /// Area average over each destination cell's footprint.
    #[default]
    Box,
    /// Nearest-neighbor: fastest, aliases thin edges away.
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with 3 lobes: sharpest.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    ///
    /// Returns `None` for [`ResampleFilter::Box`], which is implemented
    /// here rather than by `image`.
    const fn to_image_filter(self) -> Option<FilterType> {
        match self {
            Self::Box => None,
            Self::Nearest => Some(FilterType::Nearest),
            Self::Triangle => Some(FilterType::Triangle),
            Self::CatmullRom => Some(FilterType::CatmullRom),
            Self::Lanczos3 => Some(FilterType::Lanczos3),
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box => f.write_str("Box"),
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Largest character grid (`width * height` cells) a frame may resample
/// to. Larger requests fail the frame instead of allocating the grid.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Compute the output height for a source of `source_width` x
/// `source_height` resampled to `width` characters.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] if the source is empty,
/// `width` is zero, the computed height rounds to zero, or the grid
/// would exceed [`MAX_GRID_CELLS`].
pub fn target_height(
    source_width: u32,
    source_height: u32,
    width: u32,
    width_scale: f64,
) -> Result<u32, PipelineError> {
    if source_width == 0 || source_height == 0 {
        return Err(PipelineError::InvalidDimensions {
            width: source_width,
            height: source_height,
            reason: "cannot resample an empty image",
        });
    }
    if width == 0 {
        return Err(PipelineError::InvalidDimensions {
            width,
            height: source_height,
            reason: "target width must be at least 1",
        });
    }

    let height = (f64::from(source_height) * f64::from(width) * width_scale
        / f64::from(source_width))
    .round();

    if !(height >= 1.0 && height <= f64::from(u32::MAX)) {
        return Err(PipelineError::InvalidDimensions {
            width,
            height: 0,
            reason: "computed target height is out of range",
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = height as u32;
    if u64::from(width) * u64::from(height) > MAX_GRID_CELLS {
        return Err(PipelineError::InvalidDimensions {
            width,
            height,
            reason: "character grid is too large",
        });
    }
    Ok(height)
}

/// Resample `image` to `width` columns, deriving the row count with
/// [`target_height`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] under the same
/// conditions as [`target_height`].
pub fn resample(
    image: &GrayImage,
    width: u32,
    width_scale: f64,
    filter: ResampleFilter,
) -> Result<GrayImage, PipelineError> {
    let height = target_height(image.width(), image.height(), width, width_scale)?;
    Ok(match filter.to_image_filter() {
        Some(filter_type) => image::imageops::resize(image, width, height, filter_type),
        None => box_average(image, width, height),
    })
}

/// Area-average `image` into a `width` x `height` grid.
///
/// Each destination cell covers source columns
/// `floor(i * src / dst) .. ceil((i + 1) * src / dst)`, so every cell
/// sees at least one source pixel even when upsampling.
fn box_average(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    let (src_w, src_h) = image.dimensions();
    GrayImage::from_fn(width, height, |cx, cy| {
        let (x0, x1) = footprint(cx, width, src_w);
        let (y0, y1) = footprint(cy, height, src_h);

        let mut sum = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                sum += u64::from(image.get_pixel(x, y).0[0]);
            }
        }
        let count = u64::from(x1 - x0) * u64::from(y1 - y0);

        #[allow(clippy::cast_possible_truncation)]
        let mean = ((sum + count / 2) / count) as u8;
        image::Luma([mean])
    })
}

/// Source index range `[start, end)` covered by destination `index`.
#[allow(clippy::cast_possible_truncation)]
fn footprint(index: u32, dst_len: u32, src_len: u32) -> (u32, u32) {
    let src = u64::from(src_len);
    let dst = u64::from(dst_len);
    let start = u64::from(index) * src / dst;
    let end = (u64::from(index) + 1) * src;
    let end = end.div_ceil(dst);
    (start as u32, end as u32)
}

//! Luminance-to-glyph mapping.
//!
//! A [`GlyphRamp`] quantizes the `0..=255` luminance range into `R`
//! equal-width buckets, one per glyph, ordered darkest to lightest:
//!
//! ```text
//! index = min(floor(p * R / 256), R - 1)
//! ```
//!
//! [`AsciiFrame::render`] applies the ramp to every sample of a
//! resampled image, producing one line per image row.

use std::fmt;
use std::str::FromStr;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// Ordered, non-empty set of glyphs from visually darkest to lightest.
///
/// Every glyph occupies exactly one character cell, so control
/// characters (`\n`, `\r`, `\t`, ...) are refused.
///
/// Serialized as a plain string. Deserializing an invalid ramp fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlyphRamp(Vec<char>);

impl GlyphRamp {
    /// Ten-level ramp, dense glyphs first.
    pub const STANDARD: &'static str = "@%#*+=-:. ";

    /// Build a ramp from a string, one glyph per `char`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `glyphs` is empty or
    /// contains a control character.
    pub fn new(glyphs: &str) -> Result<Self, PipelineError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "glyph ramp must contain at least one character".to_string(),
            ));
        }
        if let Some(bad) = glyphs.iter().find(|c| c.is_control()) {
            return Err(PipelineError::InvalidConfig(format!(
                "glyph ramp must not contain control characters, found {bad:?}"
            )));
        }
        Ok(Self(glyphs))
    }

    /// Number of glyphs, i.e. the quantization resolution.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a ramp built through [`GlyphRamp::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The glyphs, darkest first.
    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.0
    }

    /// Ramp index for a luminance sample.
    #[must_use]
    pub fn index_for(&self, luminance: u8) -> usize {
        let levels = self.0.len();
        (usize::from(luminance) * levels / 256).min(levels.saturating_sub(1))
    }

    /// Glyph for a luminance sample.
    #[must_use]
    pub fn glyph_for(&self, luminance: u8) -> char {
        self.0[self.index_for(luminance)]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self(Self::STANDARD.chars().collect())
    }
}

impl fmt::Display for GlyphRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for glyph in &self.0 {
            fmt::Write::write_char(f, *glyph)?;
        }
        Ok(())
    }
}

impl FromStr for GlyphRamp {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for GlyphRamp {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<GlyphRamp> for String {
    fn from(ramp: GlyphRamp) -> Self {
        ramp.0.into_iter().collect()
    }
}

/// One frame of ASCII art: fixed-width lines of glyphs.
///
/// Every line holds exactly [`width`](Self::width) glyphs and there are
/// exactly [`height`](Self::height) lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    width: u32,
    lines: Vec<String>,
}

impl AsciiFrame {
    /// Map every sample of `image` through `ramp`, row-major.
    #[must_use]
    pub fn render(image: &GrayImage, ramp: &GlyphRamp) -> Self {
        let lines = image
            .rows()
            .map(|row| row.map(|p| ramp.glyph_for(p.0[0])).collect::<String>())
            .collect();
        Self {
            width: image.width(),
            lines,
        }
    }

    /// Glyphs per line.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// The lines, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`, without a trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_ramp_is_rejected() {
        assert!(matches!(
            GlyphRamp::new(""),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn control_characters_are_rejected() {
        for glyphs in ["@\n", "@\r ", "\t", "#\u{7f}.", "a\u{85}b"] {
            assert!(
                matches!(GlyphRamp::new(glyphs), Err(PipelineError::InvalidConfig(_))),
                "{glyphs:?} should be rejected",
            );
        }
        let err = GlyphRamp::new("@\n").unwrap_err();
        assert!(err.to_string().contains("'\\n'"), "{err}");
    }

    #[test]
    fn control_characters_in_json_are_rejected() {
        assert!(serde_json::from_str::<GlyphRamp>(r#""@\n ""#).is_err());
    }

    #[test]
    fn standard_ramp_bucket_boundaries() {
        let ramp = GlyphRamp::default();
        // Buckets are 25.6 luminance levels wide.
        assert_eq!(ramp.index_for(0), 0);
        assert_eq!(ramp.index_for(25), 0);
        assert_eq!(ramp.index_for(26), 1);
        assert_eq!(ramp.index_for(128), 5);
        assert_eq!(ramp.index_for(230), 8);
        assert_eq!(ramp.index_for(231), 9);
        assert_eq!(ramp.index_for(255), 9);
        assert_eq!(ramp.glyph_for(0), '@');
        assert_eq!(ramp.glyph_for(255), ' ');
    }

    #[test]
    fn quantization_is_monotonic() {
        for glyphs in ["@%#*+=-:. ", "#. ", "ab", " .:-=+*#%@$&WM"] {
            let ramp = GlyphRamp::new(glyphs).unwrap();
            let mut previous = 0;
            for p in 0..=255u8 {
                let idx = ramp.index_for(p);
                assert!(idx >= previous, "ramp {glyphs:?} not monotonic at {p}");
                assert!(idx < ramp.len());
                previous = idx;
            }
            assert_eq!(previous, ramp.len() - 1, "top bucket unused for {glyphs:?}");
        }
    }

    #[test]
    fn single_glyph_ramp_maps_everything_to_it() {
        let ramp = GlyphRamp::new("X").unwrap();
        for p in 0..=255u8 {
            assert_eq!(ramp.glyph_for(p), 'X');
        }
    }

    #[test]
    fn multibyte_glyphs_count_as_one() {
        let ramp = GlyphRamp::new("█▓▒░ ").unwrap();
        assert_eq!(ramp.len(), 5);
        assert_eq!(ramp.glyph_for(0), '█');
        assert_eq!(ramp.to_string(), "█▓▒░ ");
    }

    #[test]
    fn render_produces_fixed_width_lines() {
        let img = GrayImage::from_fn(25, 13, |x, y| image::Luma([((x * 10 + y) % 256) as u8]));
        let frame = AsciiFrame::render(&img, &GlyphRamp::default());
        assert_eq!(frame.width(), 25);
        assert_eq!(frame.height(), 13);
        for line in frame.lines() {
            assert_eq!(line.chars().count(), 25);
        }
    }

    #[test]
    fn render_is_row_major() {
        let mut img = GrayImage::from_pixel(3, 2, image::Luma([255]));
        img.put_pixel(2, 0, image::Luma([0]));
        img.put_pixel(0, 1, image::Luma([128]));
        let frame = AsciiFrame::render(&img, &GlyphRamp::default());
        assert_eq!(frame.lines(), ["  @".to_string(), "=  ".to_string()]);
    }

    #[test]
    fn text_has_no_trailing_newline() {
        let img = GrayImage::from_pixel(4, 3, image::Luma([0]));
        let frame = AsciiFrame::render(&img, &GlyphRamp::default());
        assert_eq!(frame.to_text(), "@@@@\n@@@@\n@@@@");
        assert_eq!(frame.to_string(), frame.to_text());
    }

    #[test]
    fn multibyte_lines_have_width_in_chars() {
        let img = GrayImage::from_pixel(6, 2, image::Luma([0]));
        let frame = AsciiFrame::render(&img, &GlyphRamp::new("█ ").unwrap());
        for line in frame.lines() {
            assert_eq!(line.chars().count(), 6);
            assert_eq!(line.len(), 18);
        }
    }

    #[test]
    fn ramp_parses_from_str() {
        let ramp: GlyphRamp = "#-".parse().unwrap();
        assert_eq!(ramp.glyphs(), &['#', '-']);
        assert!("".parse::<GlyphRamp>().is_err());
    }

    #[test]
    fn ramp_serializes_as_string() {
        let ramp = GlyphRamp::new("#+. ").unwrap();
        let json = serde_json::to_string(&ramp).unwrap();
        assert_eq!(json, r##""#+. ""##);
        let back: GlyphRamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ramp);
    }
}

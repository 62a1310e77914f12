use rand::Rng;
use unicode_normalization::UnicodeNormalization as _;

use crate::configuration::{TextAlignment, TextImageOptions};
use crate::fonts::FontSet;
use crate::style::{StyleSampler, WordToken};

/// Normalizes the text to NFC and splits it on any whitespace, line breaks included. The reported
/// words are the composed forms, so `"cafe\u{301}"` is reported as `"café"`.
pub fn split_words(text: &str) -> Vec<String> {
    let normalized_text = text.nfc().collect::<String>();
    normalized_text
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Partitions the items, in order, into chunks of `words_per_line`; only the last one may be shorter.
///
/// A chunk size of zero is treated as one.
pub fn chunk_words<T: Clone>(words: &[T], words_per_line: usize) -> Vec<Vec<T>> {
    words
        .chunks(words_per_line.max(1))
        .map(<[T]>::to_vec)
        .collect()
}

/// Draws a style for every word and groups the resulting tokens into lines.
pub fn compose_lines<R: Rng + ?Sized>(
    words: &[String],
    words_per_line: usize,
    sampler: &StyleSampler,
    rng: &mut R,
) -> Vec<Vec<WordToken>> {
    let word_tokens = words
        .iter()
        .map(|word| sampler.assign(word, rng))
        .collect::<Vec<_>>();
    chunk_words(&word_tokens, words_per_line)
}

/// The pixel width of a line: every word is measured with a trailing space in its own face, then the
/// width of one space in the regular face is taken off, whatever the face of the last word.
pub fn line_width(line: &[WordToken], fonts: &FontSet) -> i32 {
    let line_width = line
        .iter()
        .map(|word_token| {
            fonts
                .for_style(word_token.style)
                .measure(&format!("{} ", word_token.text))
                .width
        })
        .sum::<i32>();
    if line_width > 0 {
        line_width - fonts.regular.measure(" ").width
    } else {
        line_width
    }
}

pub fn line_widths(lines: &[Vec<WordToken>], fonts: &FontSet) -> Vec<i32> {
    lines.iter().map(|line| line_width(line, fonts)).collect()
}

/// The canvas size and every quantity that is rescaled together with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub padding: u32,
    pub line_height: u32,
}

impl CanvasGeometry {
    /// The size that fits every line with the padding on all sides.
    pub fn natural(
        line_widths: &[i32],
        font_size: u32,
        padding: u32,
        line_spacing: f64,
    ) -> CanvasGeometry {
        let widest_line = line_widths.iter().copied().max().unwrap_or(0).max(0) as u32;
        let line_height = (font_size as f64 * line_spacing) as u32;
        CanvasGeometry {
            width: widest_line + 2 * padding,
            height: line_widths.len() as u32 * line_height + 2 * padding,
            font_size,
            padding,
            line_height,
        }
    }

    /// The geometry scaled down so that the width equals `max_width`, or `None` if it already fits.
    pub fn fit_width(self, max_width: u32) -> Option<CanvasGeometry> {
        if self.width <= max_width {
            return None;
        }
        let scale_factor = max_width as f64 / self.width as f64;
        Some(CanvasGeometry {
            width: max_width,
            height: scale(self.height, scale_factor),
            ..self.rescaled(scale_factor)
        })
    }

    /// The geometry scaled down so that the height equals `max_height`, or `None` if it already fits.
    pub fn fit_height(self, max_height: u32) -> Option<CanvasGeometry> {
        if self.height <= max_height {
            return None;
        }
        let scale_factor = max_height as f64 / self.height as f64;
        Some(CanvasGeometry {
            width: scale(self.width, scale_factor),
            height: max_height,
            ..self.rescaled(scale_factor)
        })
    }

    fn rescaled(self, scale_factor: f64) -> CanvasGeometry {
        CanvasGeometry {
            font_size: scale(self.font_size, scale_factor),
            padding: scale(self.padding, scale_factor),
            line_height: scale(self.line_height, scale_factor),
            ..self
        }
    }
}

fn scale(value: u32, scale_factor: f64) -> u32 {
    (value as f64 * scale_factor) as u32
}

/// Styled lines, their measured widths, the final canvas geometry and the faces matching it.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub lines: Vec<Vec<WordToken>>,
    pub line_widths: Vec<i32>,
    pub geometry: CanvasGeometry,
    pub fonts: FontSet,
}

/// Measures the lines and sizes the canvas, rescaling for `max_width` and then for `max_height`.
///
/// Each constraint is checked once, the height one against the already width-scaled geometry. After
/// a rescale the faces are reloaded at the new size and the lines measured again.
pub fn layout_lines(lines: Vec<Vec<WordToken>>, options: &TextImageOptions) -> TextLayout {
    let font_sources = options.font_sources();
    let mut fonts = FontSet::load(&font_sources, options.font_size);
    let mut line_widths = line_widths(&lines, &fonts);
    let mut geometry = CanvasGeometry::natural(
        &line_widths,
        options.font_size,
        options.padding,
        options.line_spacing,
    );

    let width_scaled = options
        .max_width
        .and_then(|max_width| geometry.fit_width(max_width));
    if let Some(scaled_geometry) = width_scaled {
        log::debug!(
            "Rescaled the canvas from {}x{} to {}x{} to fit the maximum width",
            geometry.width,
            geometry.height,
            scaled_geometry.width,
            scaled_geometry.height
        );
        geometry = scaled_geometry;
        fonts = FontSet::load(&font_sources, geometry.font_size);
    }

    let height_scaled = options
        .max_height
        .and_then(|max_height| geometry.fit_height(max_height));
    if let Some(scaled_geometry) = height_scaled {
        log::debug!(
            "Rescaled the canvas from {}x{} to {}x{} to fit the maximum height",
            geometry.width,
            geometry.height,
            scaled_geometry.width,
            scaled_geometry.height
        );
        geometry = scaled_geometry;
        fonts = FontSet::load(&font_sources, geometry.font_size);
    }

    if width_scaled.is_some() || height_scaled.is_some() {
        line_widths = self::line_widths(&lines, &fonts);
    }

    TextLayout {
        lines,
        line_widths,
        geometry,
        fonts,
    }
}

/// The x coordinate a line starts at. Centering uses floor division, so odd free space leaves the
/// extra pixel on the right.
pub fn line_start_x(
    text_alignment: TextAlignment,
    canvas_width: u32,
    padding: u32,
    line_width: i32,
) -> i32 {
    let (canvas_width, padding) = (canvas_width as i32, padding as i32);
    match text_alignment {
        TextAlignment::Left => padding,
        TextAlignment::Right => canvas_width - padding - line_width,
        TextAlignment::Center => padding + (canvas_width - 2 * padding - line_width).div_euclid(2),
    }
}

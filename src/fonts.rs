use std::path::{Path, PathBuf};

use image::{Pixel as _, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::error::ContextError;
use crate::style::TextStyle;

/// The em size, in pixels, at which the built-in font is used whenever it replaces a requested font.
pub const DEFAULT_FONT_SIZE: u32 = 11;

static DEFAULT_FONT_DATA: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

/// The pixel extent of a string as it would be drawn.
///
/// The width is the larger of the advance width and the ink extent, the height is the extent of the
/// ink alone, so a string made only of spaces has a width but no height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub width: i32,
    pub height: i32,
}

/// A font face bound to the pixel size it is rendered at.
#[derive(Clone)]
pub struct Typeface {
    font: Font<'static>,
    scale: Scale,
    font_size: u32,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Typeface")
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl Typeface {
    fn new(font: Font<'static>, font_size: u32) -> Typeface {
        // rusttype scales by ascent-to-descent height, convert so that `font_size` is the em size
        let unscaled_metrics = font.v_metrics_unscaled();
        let units_per_em = font.units_per_em().max(1) as f32;
        let em_ratio = (unscaled_metrics.ascent - unscaled_metrics.descent) / units_per_em;
        Typeface {
            font,
            scale: Scale::uniform(font_size as f32 * em_ratio),
            font_size,
        }
    }

    /// The embedded font at `DEFAULT_FONT_SIZE`.
    pub fn builtin() -> Typeface {
        #[allow(clippy::expect_used)]
        let font = Font::try_from_bytes(DEFAULT_FONT_DATA).expect("the embedded font is valid");
        Typeface::new(font, DEFAULT_FONT_SIZE)
    }

    /// Reads and parses the font file at the given em size in pixels.
    pub fn from_path(font_path: &Path, font_size: u32) -> Result<Typeface, ContextError> {
        if font_size == 0 {
            return Err(ContextError::with_context(format!(
                "Invalid font size 0 for the font {:?}",
                font_path
            )));
        }
        let raw_font_data = std::fs::read(font_path).map_err(|error| {
            ContextError::with_error(format!("Unable to read the font {:?}", font_path), &error)
        })?;
        let font = Font::try_from_vec(raw_font_data).ok_or(ContextError::with_context(format!(
            "Unable to parse the font {:?}",
            font_path
        )))?;

        Ok(Typeface::new(font, font_size))
    }

    /// Loads the font at the given path, or the built-in font if there is none or it fails to load.
    pub fn from_path_or_builtin(font_path: Option<&Path>, font_size: u32) -> Typeface {
        match font_path {
            Some(font_path) => Typeface::from_path(font_path, font_size).unwrap_or_else(|error| {
                log::warn!("{}, using the built-in font", error);
                Typeface::builtin()
            }),
            None => Typeface::builtin(),
        }
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Measures the string as if drawn with its top-left corner at the origin.
    pub fn measure(&self, text: &str) -> TextMetrics {
        let ascent = self.font.v_metrics(self.scale).ascent;
        let (mut left, mut right) = (0, 0);
        let (mut top, mut bottom) = (i32::MAX, i32::MIN);
        let mut advance = 0.0f32;

        for glyph in self.font.layout(text, self.scale, point(0.0, ascent)) {
            advance = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
            if let Some(bounding_box) = glyph.pixel_bounding_box() {
                left = left.min(bounding_box.min.x);
                right = right.max(bounding_box.max.x);
                top = top.min(bounding_box.min.y);
                bottom = bottom.max(bounding_box.max.y);
            }
        }
        right = right.max(advance.ceil() as i32);

        TextMetrics {
            width: right - left,
            height: if top <= bottom { bottom - top } else { 0 },
        }
    }

    /// Blends the string into the canvas with its top-left corner at `(x, y)`, glyph coverage
    /// scaling the alpha of `color`. Pixels outside of the canvas are skipped.
    pub fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let ascent = self.font.v_metrics(self.scale).ascent;
        let (canvas_width, canvas_height) = canvas.dimensions();

        for glyph in self
            .font
            .layout(text, self.scale, point(x as f32, y as f32 + ascent))
        {
            let Some(bounding_box) = glyph.pixel_bounding_box() else {
                continue;
            };
            // Draw the glyph into the image per-pixel by using the draw closure
            glyph.draw(|glyph_x, glyph_y, coverage| {
                let pixel_x = glyph_x as i32 + bounding_box.min.x;
                let pixel_y = glyph_y as i32 + bounding_box.min.y;
                if pixel_x < 0
                    || pixel_y < 0
                    || pixel_x as u32 >= canvas_width
                    || pixel_y as u32 >= canvas_height
                {
                    return;
                }
                // Turn the coverage into an alpha value
                let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32) as u8;
                if alpha > 0 {
                    canvas
                        .get_pixel_mut(pixel_x as u32, pixel_y as u32)
                        .blend(&Rgba([color[0], color[1], color[2], alpha]));
                }
            });
        }
    }
}

/// Where the regular, bold and italic faces are read from.
///
/// The bold and italic faces fall back to the regular face when they are not given.
#[derive(Debug, Clone, Default)]
pub struct FontSources {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

/// The three faces a text image is drawn with.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Typeface,
    pub bold: Typeface,
    pub italic: Typeface,
}

impl FontSet {
    /// All three slots hold the built-in font.
    pub fn builtin() -> FontSet {
        let typeface = Typeface::builtin();
        FontSet {
            regular: typeface.clone(),
            bold: typeface.clone(),
            italic: typeface,
        }
    }

    /// Loads every face at the given size. If any of them fails, the failure is logged and all
    /// three slots are replaced by the built-in font.
    pub fn load(font_sources: &FontSources, font_size: u32) -> FontSet {
        let Some(regular_path) = font_sources.regular.as_deref() else {
            log::debug!("No font path provided, using the built-in font");
            return FontSet::builtin();
        };

        match FontSet::try_load(regular_path, font_sources, font_size) {
            Ok(font_set) => font_set,
            Err(error) => {
                log::warn!("{}, using the built-in font for every style", error);
                FontSet::builtin()
            }
        }
    }

    fn try_load(
        regular_path: &Path,
        font_sources: &FontSources,
        font_size: u32,
    ) -> Result<FontSet, ContextError> {
        let regular = Typeface::from_path(regular_path, font_size)?;
        let bold = match font_sources.bold.as_deref() {
            Some(bold_path) => Typeface::from_path(bold_path, font_size)?,
            None => regular.clone(),
        };
        let italic = match font_sources.italic.as_deref() {
            Some(italic_path) => Typeface::from_path(italic_path, font_size)?,
            None => regular.clone(),
        };

        Ok(FontSet {
            regular,
            bold,
            italic,
        })
    }

    /// The face a word of the given style is drawn with.
    pub fn for_style(&self, style: TextStyle) -> &Typeface {
        match style {
            TextStyle::Bold => &self.bold,
            TextStyle::Italic => &self.italic,
            TextStyle::Normal | TextStyle::Strikethrough | TextStyle::Uppercase => &self.regular,
        }
    }
}

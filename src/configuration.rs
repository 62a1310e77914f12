use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::fonts::FontSources;
use crate::style::StyleProbabilities;

/// An RGB color.
pub type Color = [u8; 3];

/// Horizontal placement of each line inside the padded canvas.
///
/// Any unrecognized value is read as `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl From<String> for TextAlignment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "left" => TextAlignment::Left,
            "right" => TextAlignment::Right,
            _ => TextAlignment::Center,
        }
    }
}

/// Corner, or center, of the canvas the watermark is anchored to.
///
/// Any unrecognized value is read as `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl From<String> for WatermarkPosition {
    fn from(value: String) -> Self {
        match value.as_str() {
            "top-left" => WatermarkPosition::TopLeft,
            "top-right" => WatermarkPosition::TopRight,
            "bottom-left" => WatermarkPosition::BottomLeft,
            "bottom-right" => WatermarkPosition::BottomRight,
            _ => WatermarkPosition::Center,
        }
    }
}

/// The axis along which the background gradient runs. Any unrecognized value is read as `Vertical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum GradientDirection {
    Horizontal,
    #[default]
    Vertical,
}

impl From<String> for GradientDirection {
    fn from(value: String) -> Self {
        match value.as_str() {
            "horizontal" => GradientDirection::Horizontal,
            _ => GradientDirection::Vertical,
        }
    }
}

/// Every option of `create_text_image`.
///
/// Missing keys take their default when read from JSON, so an options file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextImageOptions {
    pub words_per_line: usize,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub italic_font_path: Option<PathBuf>,
    pub font_size: u32,
    pub bg_color: Color,
    pub text_color: Color,
    pub padding: u32,
    pub line_spacing: f64,
    pub style_probabilities: StyleProbabilities,

    pub add_shadow: bool,
    pub shadow_offset: (i32, i32),
    pub shadow_color: Color,
    pub shadow_blur: u32,

    pub add_outline: bool,
    pub outline_width: i32,
    pub outline_color: Color,
    pub outline_opacity: f64,

    pub add_texture: bool,
    pub texture_intensity: f64,

    pub text_alignment: TextAlignment,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,

    pub add_border: bool,
    pub border_width: u32,
    pub border_color: Color,

    pub add_watermark: bool,
    pub watermark_text: String,
    pub watermark_font_size: u32,
    pub watermark_color: Color,
    pub watermark_opacity: f64,
    pub watermark_position: WatermarkPosition,

    pub add_gradient: bool,
    pub gradient_start_color: Color,
    pub gradient_end_color: Color,
    pub gradient_direction: GradientDirection,
}

impl Default for TextImageOptions {
    fn default() -> Self {
        TextImageOptions {
            words_per_line: 3,
            font_path: None,
            bold_font_path: None,
            italic_font_path: None,
            font_size: 24,
            bg_color: [255, 255, 255],
            text_color: [0, 0, 0],
            padding: 20,
            line_spacing: 1.2,
            style_probabilities: StyleProbabilities::default(),
            add_shadow: false,
            shadow_offset: (2, 2),
            shadow_color: [100, 100, 100],
            shadow_blur: 2,
            add_outline: false,
            outline_width: 1,
            outline_color: [0, 0, 0],
            outline_opacity: 1.0,
            add_texture: false,
            texture_intensity: 0.1,
            text_alignment: TextAlignment::Center,
            max_width: None,
            max_height: None,
            add_border: false,
            border_width: 5,
            border_color: [0, 0, 0],
            add_watermark: false,
            watermark_text: String::new(),
            watermark_font_size: 12,
            watermark_color: [200, 200, 200],
            watermark_opacity: 0.3,
            watermark_position: WatermarkPosition::BottomRight,
            add_gradient: false,
            gradient_start_color: [255, 255, 255],
            gradient_end_color: [240, 240, 240],
            gradient_direction: GradientDirection::Vertical,
        }
    }
}

impl TextImageOptions {
    pub fn from_path(options_path: &Path) -> Result<Self, ContextError> {
        let options_content = std::fs::read_to_string(options_path).map_err(|error| {
            ContextError::with_error(
                format!("Unable to read the options file {:?}", options_path),
                &error,
            )
        })?;
        let options: TextImageOptions = serde_json::from_str(&options_content).map_err(|error| {
            ContextError::with_error(
                format!("Unable to parse the options file {:?}", options_path),
                &error,
            )
        })?;

        Ok(options)
    }

    pub fn font_sources(&self) -> FontSources {
        FontSources {
            regular: self.font_path.clone(),
            bold: self.bold_font_path.clone(),
            italic: self.italic_font_path.clone(),
        }
    }
}

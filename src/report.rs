use std::io::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::style::TextStyle;

/// The rectangle a word was drawn in, with the style it was drawn with.
///
/// Uppercase words are labeled `uppercase` rather than `normal`, even though they are drawn with the
/// regular face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBox {
    pub word: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub style: TextStyle,
}

/// A drawn line: its text, its origin, its measured width and height, and every word in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReport {
    pub text: String,
    pub x_pos: i32,
    pub y_pos: i32,
    pub width: i32,
    pub height: u32,
    pub words: Vec<WordBox>,
}

impl LineReport {
    pub fn new(x_pos: i32, y_pos: i32, width: i32, height: u32) -> LineReport {
        LineReport {
            text: String::new(),
            x_pos,
            y_pos,
            width,
            height,
            words: Vec::new(),
        }
    }

    /// Records a drawn word, appending it to the line text with a separating space.
    pub fn push_word(&mut self, word_box: WordBox) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&word_box.word);
        self.words.push(word_box);
    }

    fn shift(&mut self, dx: i32, dy: i32) {
        self.x_pos += dx;
        self.y_pos += dy;
        for word_box in self.words.iter_mut() {
            word_box.x += dx;
            word_box.y += dy;
        }
    }
}

/// The ground truth of a rendered text image: every line and word rectangle in final canvas
/// coordinates, the canvas size and its centroid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub lines: Vec<LineReport>,
    pub image_width: u32,
    pub image_height: u32,
    pub centroid_x: u32,
    pub centroid_y: u32,
}

impl LayoutReport {
    pub fn new(lines: Vec<LineReport>, image_width: u32, image_height: u32) -> LayoutReport {
        LayoutReport {
            lines,
            image_width,
            image_height,
            centroid_x: image_width / 2,
            centroid_y: image_height / 2,
        }
    }

    /// Follows a border of `border_width` added around the canvas: the canvas grows by twice the
    /// border on each axis and every rectangle moves by the border on both axes.
    pub fn expand(&mut self, border_width: u32) {
        let offset = border_width as i32;
        for line in self.lines.iter_mut() {
            line.shift(offset, offset);
        }
        *self = LayoutReport::new(
            std::mem::take(&mut self.lines),
            self.image_width + 2 * border_width,
            self.image_height + 2 * border_width,
        );
    }

    pub fn words(&self) -> impl Iterator<Item = &WordBox> {
        self.lines.iter().flat_map(|line| line.words.iter())
    }

    /// Writes the report as an indented JSON file.
    pub fn save(&self, report_path: &Path) -> Result<(), ContextError> {
        save_json(self, report_path)
    }
}

/// Serializes the value as JSON indented by four spaces and writes it to the path.
pub fn save_json<T: Serialize>(value: &T, json_path: &Path) -> Result<(), ContextError> {
    let mut content_buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut content_buffer, formatter);
    value.serialize(&mut serializer).map_err(|error| {
        ContextError::with_error(format!("Unable to serialize {:?}", json_path), &error)
    })?;

    let mut json_file = std::fs::File::create(json_path).map_err(|error| {
        ContextError::with_error(format!("Unable to create the file {:?}", json_path), &error)
    })?;
    json_file.write_all(&content_buffer).map_err(|error| {
        ContextError::with_error(format!("Unable to write the file {:?}", json_path), &error)
    })?;

    Ok(())
}

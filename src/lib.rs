//! textsynth synthesizes labeled text images for training OCR-capable vision-language models.
//!
//! The entry point is `create_text_image`, which renders a piece of text onto a new canvas with
//! randomly styled words and a configurable set of effects, and returns the image together with a
//! `LayoutReport`: the exact rectangle of every line and word in final image coordinates, which is
//! the ground truth persisted next to the image.
//!
//! Around it, the crate offers an augmentation stage that degrades rendered images geometrically
//! and photometrically, and a generator that randomizes the styling, augments the result and saves
//! image and sidecar JSON, one sample at a time or as a parallel batch.

/// The error type of the crate.
///
/// `ContextError` holds a message describing what was being done and, if the failure came from a
/// lower layer (a file that could not be read, an image that could not be encoded), the message of
/// that error. Font failures during rendering are not reported through it: they are logged and the
/// built-in font is used instead.
pub mod error;

/// Options of the renderer, readable from JSON files where missing keys take their defaults.
pub mod configuration;

/// Font loading with fallback to the built-in face, text measurement and glyph drawing.
pub mod fonts;

/// Style assignment through an ordered table of probabilities.
pub mod style;

/// Word splitting, grouping into lines, line measurement and canvas sizing with rescaling.
pub mod layout;

/// Gradient and noise texture backgrounds.
pub mod background;

/// The rendering pipeline and its effects.
///
/// # Drawing order
///
/// The order of the stages is part of the output: solid background, gradient, texture, then per
/// word the outline, the shadow, the glyphs and the strikethrough, then the border and last the
/// watermark. The canvas is a single buffer threaded through every stage by mutable reference.
pub mod compositor;

/// The layout report returned with every image and its JSON serialization.
pub mod report;

/// Random geometric and photometric augmentations of rendered images.
pub mod augmentation;

/// Randomized sample generation, sidecar files and parallel batches.
pub mod generator;

pub use compositor::{create_text_image, create_text_image_with_rng};
pub use configuration::TextImageOptions;
pub use error::ContextError;
pub use report::LayoutReport;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use rand::{Rng, SeedableRng as _};
use rayon::iter::{IndexedParallelIterator as _, IntoParallelRefIterator as _, ParallelIterator as _};
use serde::Serialize;

use crate::augmentation::{random_augment, Augmentation, AugmentationOptions};
use crate::compositor::create_text_image_with_rng;
use crate::configuration::{TextAlignment, TextImageOptions};
use crate::error::ContextError;
use crate::report::{save_json, LayoutReport};

/// A rendered and possibly augmented text image with its ground truth.
///
/// The layout is the one of the rendered image, before any augmentation: geometric augmentations
/// listed in `augmentations` move the pixels away from it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSample {
    pub text: String,
    #[serde(skip)]
    pub image: DynamicImage,
    pub options: TextImageOptions,
    pub layout: LayoutReport,
    pub augmentations: Vec<Augmentation>,
}

/// Draws a light background, dark text, a random alignment and line shape, and each effect with
/// its own chance.
pub fn random_text_image_options<R: Rng + ?Sized>(
    font_path: Option<&Path>,
    rng: &mut R,
) -> TextImageOptions {
    let font_size = rng.gen_range(20..=40);
    let bg_color = [
        rng.gen_range(240..=255),
        rng.gen_range(240..=255),
        rng.gen_range(240..=255),
    ];
    let text_color = [
        rng.gen_range(0..=50),
        rng.gen_range(0..=50),
        rng.gen_range(0..=50),
    ];

    let add_shadow = rng.gen_bool(0.3);
    let add_outline = rng.gen_bool(0.2);
    let add_texture = rng.gen_bool(0.2);
    let add_gradient = rng.gen_bool(0.2);
    let add_border = rng.gen_bool(0.2);

    let text_alignment = *[
        TextAlignment::Left,
        TextAlignment::Center,
        TextAlignment::Right,
    ]
    .choose(rng)
    .unwrap_or(&TextAlignment::Center);

    TextImageOptions {
        words_per_line: rng.gen_range(5..=10),
        font_path: font_path.map(Path::to_path_buf),
        font_size,
        bg_color,
        text_color,
        padding: rng.gen_range(15..=30),
        line_spacing: rng.gen_range(1.1..1.4),
        add_shadow,
        add_outline,
        add_texture,
        add_gradient,
        add_border,
        text_alignment,
        ..TextImageOptions::default()
    }
}

/// Mild augmentations, applied to most samples.
pub fn sample_augmentation_options<R: Rng + ?Sized>(rng: &mut R) -> AugmentationOptions {
    AugmentationOptions {
        augmentation_probability: 0.8,
        max_augmentations: rng.gen_range(1..=4),
        stretch_range: (1.05, 1.2),
        compress_range: (0.8, 0.95),
        rotation_range: (-15.0, 15.0),
        color_range: (0.1, 0.3),
        blur_range: (0.0, 0.5),
        noise_range: (0.0, 5.0),
    }
}

/// Renders the text with randomized styling and augments the result.
pub fn generate_augmented_text_image<R: Rng + ?Sized>(
    text: &str,
    font_path: Option<&Path>,
    rng: &mut R,
) -> GeneratedSample {
    let options = random_text_image_options(font_path, rng);
    let (image, layout) = create_text_image_with_rng(text, &options, rng);
    let augmentation_options = sample_augmentation_options(rng);
    let (image, augmentations) = random_augment(&image, &augmentation_options, rng);

    GeneratedSample {
        text: text.to_string(),
        image,
        options,
        layout,
        augmentations,
    }
}

/// Generates a sample and saves it to `output_path`, with a JSON sidecar of the same stem holding
/// the text, options, layout and augmentations. The parent directory is created if needed.
pub fn save_augmented_text_image<R: Rng + ?Sized>(
    text: &str,
    output_path: &Path,
    font_path: Option<&Path>,
    rng: &mut R,
) -> Result<PathBuf, ContextError> {
    let sample = generate_augmented_text_image(text, font_path, rng);

    if let Some(parent_directory) = output_path.parent() {
        if !parent_directory.as_os_str().is_empty() {
            std::fs::create_dir_all(parent_directory).map_err(|error| {
                ContextError::with_error(
                    format!("Unable to create the directory {:?}", parent_directory),
                    &error,
                )
            })?;
        }
    }
    sample.image.save(output_path).map_err(|error| {
        ContextError::with_error(format!("Unable to save the image {:?}", output_path), &error)
    })?;
    save_json(&sample, &output_path.with_extension("json"))?;
    log::info!("Saved the sample to the path {:?}", output_path);

    Ok(output_path.to_path_buf())
}

/// Saves one sample per text into the directory, in parallel. The sample at `index` is named
/// `sample_<index>.png` and uses its own generator seeded with `seed + index`, so the output does
/// not depend on scheduling.
pub fn generate_batch(
    texts: &[String],
    output_directory: &Path,
    font_path: Option<&Path>,
    seed: u64,
) -> Result<Vec<PathBuf>, ContextError> {
    std::fs::create_dir_all(output_directory).map_err(|error| {
        ContextError::with_error(
            format!("Unable to create the directory {:?}", output_directory),
            &error,
        )
    })?;

    texts
        .par_iter()
        .enumerate()
        .map(|(index, text)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
            let output_path = output_directory.join(format!("sample_{:05}.png", index));
            save_augmented_text_image(text, &output_path, font_path, &mut rng)
        })
        .collect()
}

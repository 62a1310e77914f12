use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use rand::seq::SliceRandom as _;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A geometric or photometric transform applied to a rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Augmentation {
    StretchHorizontal,
    StretchVertical,
    CompressHorizontal,
    CompressVertical,
    ColorDegradation,
    Brightness,
    Contrast,
    Sharpness,
    Rotation,
    GaussianBlur,
    Noise,
}

impl Augmentation {
    pub const ALL: [Augmentation; 11] = [
        Augmentation::StretchHorizontal,
        Augmentation::StretchVertical,
        Augmentation::CompressHorizontal,
        Augmentation::CompressVertical,
        Augmentation::ColorDegradation,
        Augmentation::Brightness,
        Augmentation::Contrast,
        Augmentation::Sharpness,
        Augmentation::Rotation,
        Augmentation::GaussianBlur,
        Augmentation::Noise,
    ];
}

/// Parameter ranges of the augmentations. Every range is sampled uniformly, an empty or inverted
/// range always yields its lower bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationOptions {
    /// The chance that the image is augmented at all.
    pub augmentation_probability: f64,
    pub max_augmentations: usize,
    pub stretch_range: (f64, f64),
    pub compress_range: (f64, f64),
    /// In degrees, positive angles turn counterclockwise.
    pub rotation_range: (f64, f64),
    /// Saturation factor, zero gives a grayscale image.
    pub color_range: (f64, f64),
    /// Standard deviation of the Gaussian blur.
    pub blur_range: (f64, f64),
    /// Standard deviation of the additive noise, in 8-bit channel units.
    pub noise_range: (f64, f64),
}

impl Default for AugmentationOptions {
    fn default() -> Self {
        AugmentationOptions {
            augmentation_probability: 0.5,
            max_augmentations: 3,
            stretch_range: (1.1, 1.3),
            compress_range: (0.7, 0.9),
            rotation_range: (-25.0, 25.0),
            color_range: (0.3, 0.8),
            blur_range: (0.0, 1.0),
            noise_range: (0.0, 10.0),
        }
    }
}

/// With probability `augmentation_probability`, applies between one and `max_augmentations`
/// distinct augmentations picked at random, in random order.
///
/// Returns the augmented image, in the color type of the input, and the augmentations applied.
pub fn random_augment<R: Rng + ?Sized>(
    image: &DynamicImage,
    augmentation_options: &AugmentationOptions,
    rng: &mut R,
) -> (DynamicImage, Vec<Augmentation>) {
    let augmentation_probability = augmentation_options
        .augmentation_probability
        .clamp(0.0, 1.0);
    if !rng.gen_bool(augmentation_probability) {
        return (image.clone(), Vec::new());
    }

    let max_augmentations = augmentation_options
        .max_augmentations
        .clamp(1, Augmentation::ALL.len());
    let augmentation_count = rng.gen_range(1..=max_augmentations);
    let augmentations = Augmentation::ALL
        .choose_multiple(rng, augmentation_count)
        .copied()
        .collect::<Vec<_>>();
    log::debug!("Applying the augmentations {:?}", augmentations);

    let mut augmented_image = image.to_rgba8();
    for &augmentation in augmentations.iter() {
        augmented_image = apply(augmentation, &augmented_image, augmentation_options, rng);
    }

    let augmented_image = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(augmented_image)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(augmented_image).into_rgb8())
    };
    (augmented_image, augmentations)
}

/// Applies one augmentation with parameters drawn from the option ranges.
pub fn apply<R: Rng + ?Sized>(
    augmentation: Augmentation,
    image: &RgbaImage,
    augmentation_options: &AugmentationOptions,
    rng: &mut R,
) -> RgbaImage {
    match augmentation {
        Augmentation::StretchHorizontal => {
            resize_axes(image, sample(rng, augmentation_options.stretch_range), 1.0)
        }
        Augmentation::StretchVertical => {
            resize_axes(image, 1.0, sample(rng, augmentation_options.stretch_range))
        }
        Augmentation::CompressHorizontal => {
            resize_axes(image, sample(rng, augmentation_options.compress_range), 1.0)
        }
        Augmentation::CompressVertical => {
            resize_axes(image, 1.0, sample(rng, augmentation_options.compress_range))
        }
        Augmentation::ColorDegradation => {
            adjust_saturation(image, sample(rng, augmentation_options.color_range))
        }
        Augmentation::Brightness => adjust_brightness(image, sample(rng, (0.8, 1.2))),
        Augmentation::Contrast => adjust_contrast(image, sample(rng, (0.8, 1.2))),
        Augmentation::Sharpness => adjust_sharpness(image, sample(rng, (0.8, 1.2))),
        Augmentation::Rotation => {
            rotate_expanded(image, sample(rng, augmentation_options.rotation_range))
        }
        Augmentation::GaussianBlur => {
            let sigma = sample(rng, augmentation_options.blur_range);
            if sigma > 0.0 {
                imageops::blur(image, sigma as f32)
            } else {
                image.clone()
            }
        }
        Augmentation::Noise => {
            let standard_deviation = sample(rng, augmentation_options.noise_range);
            add_noise(image, standard_deviation, rng)
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    if low < high {
        rng.gen_range(low..high)
    } else {
        low
    }
}

fn resize_axes(image: &RgbaImage, horizontal_factor: f64, vertical_factor: f64) -> RgbaImage {
    let width = ((image.width() as f64 * horizontal_factor) as u32).max(1);
    let height = ((image.height() as f64 * vertical_factor) as u32).max(1);
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Moves every color channel from the degenerate image toward the image by `factor`; a factor of
/// zero gives the degenerate image, one leaves the image unchanged. Alpha is kept.
fn interpolate_from(degenerate: &RgbaImage, image: &RgbaImage, factor: f64) -> RgbaImage {
    let mut enhanced = image.clone();
    for (enhanced_pixel, degenerate_pixel) in enhanced.pixels_mut().zip(degenerate.pixels()) {
        for channel in 0..3 {
            let from = degenerate_pixel[channel] as f64;
            let to = enhanced_pixel[channel] as f64;
            enhanced_pixel[channel] = (from + factor * (to - from)).round().clamp(0.0, 255.0) as u8;
        }
    }
    enhanced
}

fn luma(pixel: &Rgba<u8>) -> u8 {
    ((pixel[0] as u32 * 299 + pixel[1] as u32 * 587 + pixel[2] as u32 * 114) / 1000) as u8
}

fn adjust_saturation(image: &RgbaImage, factor: f64) -> RgbaImage {
    let mut grayscale = image.clone();
    for pixel in grayscale.pixels_mut() {
        let gray = luma(pixel);
        *pixel = Rgba([gray, gray, gray, pixel[3]]);
    }
    interpolate_from(&grayscale, image, factor)
}

fn adjust_brightness(image: &RgbaImage, factor: f64) -> RgbaImage {
    let black = RgbaImage::from_pixel(image.width(), image.height(), Rgba([0, 0, 0, 255]));
    interpolate_from(&black, image, factor)
}

fn adjust_contrast(image: &RgbaImage, factor: f64) -> RgbaImage {
    let pixel_count = image.width() as u64 * image.height() as u64;
    if pixel_count == 0 {
        return image.clone();
    }
    let luma_sum = image.pixels().map(|pixel| luma(pixel) as u64).sum::<u64>();
    let mean = (luma_sum as f64 / pixel_count as f64 + 0.5) as u8;
    let mean_gray = RgbaImage::from_pixel(image.width(), image.height(), Rgba([mean, mean, mean, 255]));
    interpolate_from(&mean_gray, image, factor)
}

fn adjust_sharpness(image: &RgbaImage, factor: f64) -> RgbaImage {
    if image.width() < 3 || image.height() < 3 {
        return image.clone();
    }
    let smoothed = imageops::filter3x3(image, &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0]);
    interpolate_from(&smoothed, image, factor)
}

/// Rotates counterclockwise about the center, growing the canvas so that no corner is cut off.
/// Uncovered pixels are transparent black.
pub fn rotate_expanded(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (width, height) = (image.width() as f64, image.height() as f64);
    // The epsilon keeps right angles from rounding up a pixel
    let rotated_width = (width * cos.abs() + height * sin.abs() - 1e-9).ceil().max(1.0);
    let rotated_height = (width * sin.abs() + height * cos.abs() - 1e-9).ceil().max(1.0);
    let (center_x, center_y) = (width / 2.0, height / 2.0);
    let (rotated_center_x, rotated_center_y) = (rotated_width / 2.0, rotated_height / 2.0);

    RgbaImage::from_fn(rotated_width as u32, rotated_height as u32, |x, y| {
        let dx = x as f64 + 0.5 - rotated_center_x;
        let dy = y as f64 + 0.5 - rotated_center_y;
        let source_x = cos * dx - sin * dy + center_x - 0.5;
        let source_y = sin * dx + cos * dy + center_y - 0.5;
        sample_bilinear(image, source_x, source_y)
    })
}

fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (left, top) = (x.floor(), y.floor());
    let (horizontal_weight, vertical_weight) = (x - left, y - top);
    let texel = |column: f64, row: f64| -> [f64; 4] {
        if column < 0.0 || row < 0.0 {
            return [0.0; 4];
        }
        match image.get_pixel_checked(column as u32, row as u32) {
            Some(pixel) => pixel.0.map(|channel| channel as f64),
            None => [0.0; 4],
        }
    };

    let top_left = texel(left, top);
    let top_right = texel(left + 1.0, top);
    let bottom_left = texel(left, top + 1.0);
    let bottom_right = texel(left + 1.0, top + 1.0);

    let mut interpolated = [0u8; 4];
    for channel in 0..4 {
        let upper = top_left[channel] + (top_right[channel] - top_left[channel]) * horizontal_weight;
        let lower =
            bottom_left[channel] + (bottom_right[channel] - bottom_left[channel]) * horizontal_weight;
        interpolated[channel] = (upper + (lower - upper) * vertical_weight)
            .round()
            .clamp(0.0, 255.0) as u8;
    }
    Rgba(interpolated)
}

/// Adds zero-mean Gaussian noise to every color channel, clamped to the channel range.
pub fn add_noise<R: Rng + ?Sized>(
    image: &RgbaImage,
    standard_deviation: f64,
    rng: &mut R,
) -> RgbaImage {
    let mut noisy_image = image.clone();
    if standard_deviation <= 0.0 {
        return noisy_image;
    }
    for pixel in noisy_image.pixels_mut() {
        for channel in 0..3 {
            let noise = standard_normal(rng) * standard_deviation;
            pixel[channel] = (pixel[channel] as f64 + noise).round().clamp(0.0, 255.0) as u8;
        }
    }
    noisy_image
}

/// Box-Muller transform of two uniform draws.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let uniform: f64 = 1.0 - rng.gen::<f64>();
    let angle: f64 = rng.gen::<f64>() * std::f64::consts::TAU;
    (-2.0 * uniform.ln()).sqrt() * angle.cos()
}

use image::{imageops, DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use rand::Rng;

use crate::configuration::{Color, GradientDirection};

/// A linear gradient from `start_color` to `end_color`, drawn one line of pixels at a time
/// perpendicular to the direction. The channel values are truncated, so the last line stops short of
/// `end_color` by at most one step.
pub fn create_gradient(
    width: u32,
    height: u32,
    start_color: Color,
    end_color: Color,
    direction: GradientDirection,
) -> RgbaImage {
    let mut gradient = RgbaImage::new(width, height);
    let length = match direction {
        GradientDirection::Horizontal => width,
        GradientDirection::Vertical => height,
    };

    for position in 0..length {
        let interpolate = |channel: usize| {
            let start = start_color[channel] as f64;
            let end = end_color[channel] as f64;
            (start + (end - start) * position as f64 / length as f64) as u8
        };
        let color = Rgba([interpolate(0), interpolate(1), interpolate(2), 255]);

        match direction {
            GradientDirection::Horizontal => {
                for y in 0..height {
                    gradient.put_pixel(position, y, color);
                }
            }
            GradientDirection::Vertical => {
                for x in 0..width {
                    gradient.put_pixel(x, position, color);
                }
            }
        }
    }

    gradient
}

/// Gray noise, smoothed more at low intensity and contrasted more at high intensity.
pub fn create_texture<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    intensity: f64,
    rng: &mut R,
) -> RgbaImage {
    if width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    let noise = GrayImage::from_fn(width, height, |_, _| Luma([rng.gen_range(0..255)]));

    let blur_radius = ((3.0 * (1.0 - intensity)) as i32).max(1);
    let smoothed_noise = imageops::blur(&noise, blur_radius as f32);
    let texture = enhance_contrast(&smoothed_noise, 1.0 + intensity);

    DynamicImage::ImageLuma8(texture).to_rgba8()
}

/// Moves every pixel away from the rounded mean gray level by `factor`.
fn enhance_contrast(image: &GrayImage, factor: f64) -> GrayImage {
    let pixel_count = image.width() as u64 * image.height() as u64;
    if pixel_count == 0 {
        return image.clone();
    }
    let sum = image.pixels().map(|pixel| pixel[0] as u64).sum::<u64>();
    let mean = (sum as f64 / pixel_count as f64 + 0.5).floor();

    let mut enhanced = image.clone();
    for pixel in enhanced.pixels_mut() {
        let value = mean + factor * (pixel[0] as f64 - mean);
        pixel[0] = value.clamp(0.0, 255.0) as u8;
    }
    enhanced
}

/// Interpolates the color channels of `base` toward `overlay` by `alpha`, in place. The alpha
/// channel of `base` is kept and pixels outside of the overlay are left untouched.
pub fn blend(base: &mut RgbaImage, overlay: &RgbaImage, alpha: f64) {
    for (base_pixel, overlay_pixel) in base.pixels_mut().zip(overlay.pixels()) {
        for channel in 0..3 {
            let from = base_pixel[channel] as f64;
            let to = overlay_pixel[channel] as f64;
            base_pixel[channel] = (from + alpha * (to - from)).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;

    #[test]
    fn vertical_gradient_is_monotonic_between_the_endpoints() {
        let gradient = create_gradient(
            8,
            100,
            [255, 0, 100],
            [0, 200, 100],
            GradientDirection::Vertical,
        );

        assert_eq!(gradient.get_pixel(3, 0), &Rgba([255, 0, 100, 255]));
        let last = gradient.get_pixel(3, 99);
        assert!(last[0] <= 3 && last[1] >= 197 && last[2] == 100);

        for y in 1..100 {
            let (previous, current) = (gradient.get_pixel(0, y - 1), gradient.get_pixel(0, y));
            assert!(current[0] <= previous[0]);
            assert!(current[1] >= previous[1]);
            // Every pixel of a row has the same color
            assert_eq!(gradient.get_pixel(7, y), current);
        }
    }

    #[test]
    fn horizontal_gradient_runs_along_x() {
        let gradient = create_gradient(
            50,
            4,
            [0, 0, 0],
            [100, 100, 100],
            GradientDirection::Horizontal,
        );
        assert_eq!(gradient.get_pixel(0, 3), &Rgba([0, 0, 0, 255]));
        assert_eq!(gradient.get_pixel(25, 0), &Rgba([50, 50, 50, 255]));
        assert_eq!(gradient.get_pixel(49, 2), &Rgba([98, 98, 98, 255]));
    }

    #[test]
    fn texture_is_gray_and_canvas_sized() {
        let mut rng = StdRng::seed_from_u64(5);
        let texture = create_texture(64, 32, 0.5, &mut rng);
        assert_eq!(texture.dimensions(), (64, 32));
        assert!(texture
            .pixels()
            .all(|pixel| pixel[0] == pixel[1] && pixel[1] == pixel[2] && pixel[3] == 255));
    }

    #[test]
    fn same_seed_same_texture() {
        let first = create_texture(20, 20, 0.1, &mut StdRng::seed_from_u64(11));
        let second = create_texture(20, 20, 0.1, &mut StdRng::seed_from_u64(11));
        assert_eq!(first, second);
    }

    #[test]
    fn contrast_spreads_values_around_the_mean() {
        let image = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 100 } else { 150 }]));
        let enhanced = enhance_contrast(&image, 2.0);
        assert_eq!(enhanced.get_pixel(0, 0)[0], 75);
        assert_eq!(enhanced.get_pixel(1, 0)[0], 175);
    }

    #[test]
    fn blend_interpolates_color_and_keeps_alpha() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 100, 0]));
        blend(&mut base, &overlay, 0.7);
        assert_eq!(base.get_pixel(1, 1), &Rgba([170, 30, 100, 255]));

        let mut unchanged = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        blend(&mut unchanged, &overlay, 0.0);
        assert_eq!(unchanged.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }
}

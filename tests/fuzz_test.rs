use rand::Rng;
use textsynth::configuration::{GradientDirection, TextAlignment, WatermarkPosition};
use textsynth::{create_text_image_with_rng, TextImageOptions};

const ITERATIONS: usize = 40;
const MAXIMUM_STRING_LENGTH: usize = 120;

fn random_options(rng: &mut rand::rngs::ThreadRng) -> TextImageOptions {
    TextImageOptions {
        words_per_line: rng.gen_range(0..8),
        font_size: rng.gen_range(0..48),
        padding: rng.gen_range(0..30),
        line_spacing: rng.gen_range(0.5..2.0),
        add_shadow: rng.gen(),
        shadow_blur: rng.gen_range(0..4),
        add_outline: rng.gen(),
        outline_width: rng.gen_range(0..4),
        add_texture: rng.gen(),
        texture_intensity: rng.gen_range(0.0..1.0),
        text_alignment: [TextAlignment::Left, TextAlignment::Center, TextAlignment::Right]
            [rng.gen_range(0..3)],
        max_width: rng.gen_bool(0.5).then(|| rng.gen_range(1..400)),
        max_height: rng.gen_bool(0.5).then(|| rng.gen_range(1..400)),
        add_border: rng.gen(),
        border_width: rng.gen_range(0..10),
        add_watermark: rng.gen(),
        watermark_text: random_utf8_characters(rng, 12),
        watermark_position: [
            WatermarkPosition::TopLeft,
            WatermarkPosition::TopRight,
            WatermarkPosition::BottomLeft,
            WatermarkPosition::BottomRight,
            WatermarkPosition::Center,
        ][rng.gen_range(0..5)],
        add_gradient: rng.gen(),
        gradient_direction: [GradientDirection::Vertical, GradientDirection::Horizontal]
            [rng.gen_range(0..2)],
        ..TextImageOptions::default()
    }
}

fn random_utf8_characters(rng: &mut rand::rngs::ThreadRng, maximum_length: usize) -> String {
    let length = rng.gen_range(1..=maximum_length);
    rand_utf8::rand_utf8(rng, length).to_string()
}

#[test]
fn render_random_texts_with_random_options() {
    let mut rng = rand::thread_rng();
    for _ in 0..ITERATIONS {
        let text = random_utf8_characters(&mut rng, MAXIMUM_STRING_LENGTH);
        let options = random_options(&mut rng);
        let (image, layout_report) = create_text_image_with_rng(&text, &options, &mut rng);

        assert_eq!(
            (image.width(), image.height()),
            (layout_report.image_width, layout_report.image_height)
        );
        assert_eq!(layout_report.words().count(), text.split_whitespace().count());
        assert_eq!(layout_report.centroid_x, layout_report.image_width / 2);
        assert_eq!(layout_report.centroid_y, layout_report.image_height / 2);
    }
}

use image::{DynamicImage, Rgba, RgbaImage};
use rand::{rngs::StdRng, SeedableRng as _};
use textsynth::background::{blend, create_texture};
use textsynth::compositor::{expand_border, watermark_origin};
use textsynth::configuration::{TextAlignment, WatermarkPosition};
use textsynth::fonts::Typeface;
use textsynth::style::{StyleProbabilities, TextStyle};
use textsynth::{create_text_image, create_text_image_with_rng, TextImageOptions};

fn plain_options() -> TextImageOptions {
    TextImageOptions {
        style_probabilities: StyleProbabilities::new(vec![(TextStyle::Normal, 1.0)]),
        ..TextImageOptions::default()
    }
}

#[test]
fn one_word_per_line() {
    let options = TextImageOptions {
        words_per_line: 1,
        ..plain_options()
    };
    let (image, layout_report) = create_text_image("Hello world", &options);

    assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    assert_eq!(layout_report.lines.len(), 2);
    assert_eq!(layout_report.lines[0].text, "Hello");
    assert_eq!(layout_report.lines[1].text, "world");
    // Two lines of 24 * 1.2 truncated to 28 pixels, with 20 pixels of padding above and below
    assert_eq!(layout_report.image_height, 96);
    assert_eq!(layout_report.lines[0].y_pos, 20);
    assert_eq!(layout_report.lines[1].y_pos, 48);
    assert_eq!(
        (image.width(), image.height()),
        (layout_report.image_width, layout_report.image_height)
    );
    assert_eq!(layout_report.centroid_y, 48);
}

#[test]
fn empty_text_gives_a_padding_only_canvas() {
    let (image, layout_report) = create_text_image(" \n\t ", &TextImageOptions::default());
    assert_eq!((image.width(), image.height()), (40, 40));
    assert!(layout_report.lines.is_empty());
    assert_eq!((layout_report.centroid_x, layout_report.centroid_y), (20, 20));
}

#[test]
fn left_aligned_lines_start_at_the_padding() {
    let options = TextImageOptions {
        text_alignment: TextAlignment::Left,
        words_per_line: 2,
        ..plain_options()
    };
    let (_, layout_report) = create_text_image("the quick brown fox jumps", &options);

    assert_eq!(layout_report.lines.len(), 3);
    for line in layout_report.lines.iter() {
        assert_eq!(line.x_pos, 20);
        assert_eq!(line.words[0].x, 20);
        let mut previous_end = i32::MIN;
        for word_box in line.words.iter() {
            assert!(word_box.x > previous_end);
            previous_end = word_box.x + word_box.width;
        }
    }
}

#[test]
fn border_matches_a_manual_expansion() {
    let text = "A border around a short paragraph of text";
    let options = TextImageOptions {
        add_gradient: true,
        add_texture: true,
        ..TextImageOptions::default()
    };
    let bordered_options = TextImageOptions {
        add_border: true,
        border_width: 7,
        border_color: [30, 60, 90],
        ..options.clone()
    };

    let (image, mut layout_report) =
        create_text_image_with_rng(text, &options, &mut StdRng::seed_from_u64(5));
    let (bordered_image, bordered_report) =
        create_text_image_with_rng(text, &bordered_options, &mut StdRng::seed_from_u64(5));

    assert_eq!(bordered_image.width(), image.width() + 14);
    assert_eq!(bordered_image.height(), image.height() + 14);
    let first_word = layout_report.words().next().cloned().unwrap();
    let bordered_first_word = bordered_report.words().next().cloned().unwrap();
    assert_eq!(bordered_first_word.x, first_word.x + 7);
    assert_eq!(bordered_first_word.y, first_word.y + 7);

    let expanded_image = DynamicImage::ImageRgba8(expand_border(&image.to_rgba8(), 7, [30, 60, 90]));
    layout_report.expand(7);
    similar_asserts::assert_eq!(layout_report, bordered_report);
    assert!(expanded_image.to_rgb8() == bordered_image.to_rgb8());
}

#[test]
fn effects_do_not_move_the_layout() {
    let text = "Shadows, outlines and textures only change pixels";
    let options = TextImageOptions {
        text_alignment: TextAlignment::Right,
        ..TextImageOptions::default()
    };
    let decorated_options = TextImageOptions {
        add_shadow: true,
        add_outline: true,
        outline_width: 2,
        add_texture: true,
        add_gradient: true,
        ..options.clone()
    };

    let (image, layout_report) =
        create_text_image_with_rng(text, &options, &mut StdRng::seed_from_u64(13));
    let (decorated_image, decorated_report) =
        create_text_image_with_rng(text, &decorated_options, &mut StdRng::seed_from_u64(13));

    similar_asserts::assert_eq!(layout_report, decorated_report);
    assert!(image.to_rgb8() != decorated_image.to_rgb8());
}

#[test]
fn uppercase_words_are_drawn_folded() {
    let options = TextImageOptions {
        style_probabilities: StyleProbabilities::new(vec![(TextStyle::Uppercase, 1.0)]),
        ..TextImageOptions::default()
    };
    let (_, layout_report) = create_text_image("mixed Case words", &options);

    assert_eq!(layout_report.lines[0].text, "MIXED CASE WORDS");
    assert!(layout_report
        .words()
        .all(|word_box| word_box.style == TextStyle::Uppercase));
}

#[test]
fn rescaled_canvas_respects_the_limits() {
    let text = "This line is far too long to fit in the narrow canvas it is given here";
    let options = TextImageOptions {
        words_per_line: 20,
        max_width: Some(300),
        max_height: Some(50),
        ..plain_options()
    };
    let (image, layout_report) = create_text_image(text, &options);

    assert!(image.width() <= 300);
    assert!(image.height() <= 50);
    assert_eq!(layout_report.lines.len(), 1);
    assert_eq!(layout_report.words().count(), 16);
}

#[test]
fn watermark_keeps_the_alpha_channel() {
    let options = TextImageOptions {
        add_watermark: true,
        watermark_text: "SAMPLE".to_string(),
        ..TextImageOptions::default()
    };
    let (image, _) = create_text_image("Watermarked text", &options);
    assert!(matches!(image, DynamicImage::ImageRgba8(_)));

    let empty_watermark = TextImageOptions {
        watermark_text: String::new(),
        ..options
    };
    let (image, _) = create_text_image("Watermarked text", &empty_watermark);
    assert!(matches!(image, DynamicImage::ImageRgb8(_)));
}

#[test]
fn strikethrough_crosses_the_middle_of_the_word() {
    let options = TextImageOptions {
        font_size: 45,
        style_probabilities: StyleProbabilities::new(vec![(TextStyle::Strikethrough, 1.0)]),
        ..TextImageOptions::default()
    };
    let (image, layout_report) = create_text_image("struck", &options);
    let image = image.to_rgb8();
    let word_box = layout_report.words().next().cloned().unwrap();
    assert_eq!(word_box.style, TextStyle::Strikethrough);

    let row_is_black = |row: i32| {
        (word_box.x..=word_box.x + word_box.width)
            .all(|column| image.get_pixel(column as u32, row as u32).0 == [0, 0, 0])
    };
    // 45 / 15 gives a line three pixels thick centered on the middle of the word
    let middle = word_box.y + word_box.height / 2;
    assert!(row_is_black(middle - 1));
    assert!(row_is_black(middle));
    assert!(row_is_black(middle + 1));
    let black_rows = (0..image.height() as i32)
        .filter(|&row| row_is_black(row))
        .count();
    assert_eq!(black_rows, 3);
}

#[test]
fn gradient_is_blended_at_seventy_percent() {
    let options = TextImageOptions {
        add_gradient: true,
        gradient_start_color: [0, 0, 0],
        gradient_end_color: [0, 0, 0],
        ..TextImageOptions::default()
    };
    let (image, _) = create_text_image("", &options);
    let image = image.to_rgb8();
    assert_eq!(image.dimensions(), (40, 40));
    // 255 - 0.7 * 255 = 76.5, rounded
    assert_eq!(image.get_pixel(0, 0).0, [77, 77, 77]);
    assert!(image.pixels().all(|pixel| pixel.0 == [77, 77, 77]));
}

#[test]
fn texture_is_blended_in_proportion_to_its_intensity() {
    let options = TextImageOptions {
        add_texture: true,
        texture_intensity: 0.5,
        ..TextImageOptions::default()
    };
    let (image, _) = create_text_image_with_rng("", &options, &mut StdRng::seed_from_u64(31));

    let mut expected = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
    let texture = create_texture(40, 40, 0.5, &mut StdRng::seed_from_u64(31));
    blend(&mut expected, &texture, 0.7 * 0.5);
    assert!(image.to_rgb8() == DynamicImage::ImageRgba8(expected).into_rgb8());
}

#[test]
fn shadow_is_the_glyphs_moved_by_the_offset() {
    let options = TextImageOptions {
        padding: 60,
        text_color: [0, 0, 0],
        shadow_color: [255, 0, 0],
        shadow_offset: (3, 40),
        shadow_blur: 0,
        ..plain_options()
    };
    let shadowed_options = TextImageOptions {
        add_shadow: true,
        ..options.clone()
    };
    let (image, layout_report) = create_text_image("shadow", &options);
    let (shadowed_image, shadowed_report) = create_text_image("shadow", &shadowed_options);
    assert_eq!(layout_report, shadowed_report);
    let (image, shadowed_image) = (image.to_rgb8(), shadowed_image.to_rgb8());

    let word_box = layout_report.words().next().cloned().unwrap();
    let mut shadow_ink = 0;
    for row in word_box.y..word_box.y + word_box.height {
        for column in word_box.x..word_box.x + word_box.width {
            let glyph_pixel = image.get_pixel(column as u32, row as u32);
            let shadow_pixel = shadowed_image.get_pixel(column as u32 + 3, row as u32 + 40);
            // The red channel of a red shadow over white stays saturated
            assert!(shadow_pixel[0] >= 253);
            assert!((shadow_pixel[1] as i32 - glyph_pixel[1] as i32).abs() <= 2);
            if shadow_pixel[1] < 128 {
                shadow_ink += 1;
            }
        }
    }
    assert!(shadow_ink > 0);
}

#[test]
fn watermark_is_drawn_with_its_opacity() {
    let options = TextImageOptions {
        padding: 100,
        add_watermark: true,
        watermark_text: "SAMPLE".to_string(),
        watermark_font_size: 40,
        watermark_color: [0, 0, 0],
        watermark_opacity: 0.3,
        watermark_position: WatermarkPosition::BottomRight,
        ..TextImageOptions::default()
    };
    let (image, _) = create_text_image("", &options);
    let image = image.to_rgba8();
    assert_eq!(image.dimensions(), (200, 200));
    assert!(image.pixels().all(|pixel| pixel[3] == 255));

    let metrics = Typeface::from_path_or_builtin(None, 40).measure("SAMPLE");
    let (origin_x, origin_y) =
        watermark_origin(WatermarkPosition::BottomRight, 200, 200, metrics);
    let mut darkest = 255;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] != 255 {
            assert!(x as i32 >= origin_x && (x as i32) < origin_x + metrics.width);
            assert!(y as i32 >= origin_y);
        }
        darkest = darkest.min(pixel[0]);
    }
    // Fully covered pixels get an alpha of int(255 * 0.3) = 76 over white
    assert!((178..=180).contains(&darkest));
}

use image::{imageops, DynamicImage, Rgba, RgbaImage};
use rand::Rng;

use crate::background::{blend, create_gradient, create_texture};
use crate::configuration::{Color, TextImageOptions, WatermarkPosition};
use crate::fonts::{TextMetrics, Typeface};
use crate::layout::{compose_lines, layout_lines, line_start_x, split_words, TextLayout};
use crate::report::{LayoutReport, LineReport, WordBox};
use crate::style::{TextStyle, WordToken};

/// How much the gradient replaces the solid background.
pub const GRADIENT_BLEND_FACTOR: f64 = 0.7;
/// Multiplied by the texture intensity to get the texture blend factor.
pub const TEXTURE_BLEND_SCALE: f64 = 0.7;
/// Distance of a corner watermark from the canvas edges.
pub const WATERMARK_INSET: i32 = 10;

/// Renders the text with the options using the thread-local random generator.
///
/// See `create_text_image_with_rng`.
pub fn create_text_image(text: &str, options: &TextImageOptions) -> (DynamicImage, LayoutReport) {
    create_text_image_with_rng(text, options, &mut rand::thread_rng())
}

/// Renders the text into a new image and reports where every line and word was drawn.
///
/// The words are styled, grouped into lines and measured, the canvas is sized (and rescaled if it
/// exceeds `max_width` or `max_height`), then the effects are applied in this order: background
/// gradient, background texture, and for each word its outline, shadow, glyphs and strikethrough,
/// then the border and finally the watermark. The image is RGB, or RGBA when a watermark was
/// composited. The report coordinates include the border offset.
///
/// Every random decision (style draws, texture noise) is taken from `rng`, so a seeded generator
/// reproduces the same image.
pub fn create_text_image_with_rng<R: Rng + ?Sized>(
    text: &str,
    options: &TextImageOptions,
    rng: &mut R,
) -> (DynamicImage, LayoutReport) {
    let words = split_words(text);
    let sampler = options.style_probabilities.sampler();
    let lines = compose_lines(&words, options.words_per_line, &sampler, rng);
    let layout = layout_lines(lines, options);
    let (image_width, image_height) = (layout.geometry.width, layout.geometry.height);
    log::debug!(
        "Laid out {} words in {} lines on a {}x{} canvas",
        words.len(),
        layout.lines.len(),
        image_width,
        image_height
    );

    let mut canvas = RgbaImage::from_pixel(image_width, image_height, opaque(options.bg_color));
    paint_background(&mut canvas, options, rng);
    let line_reports = draw_lines(&mut canvas, &layout, options);
    let mut layout_report = LayoutReport::new(line_reports, image_width, image_height);

    if options.add_border {
        canvas = expand_border(&canvas, options.border_width, options.border_color);
        layout_report.expand(options.border_width);
    }

    if options.add_watermark && !options.watermark_text.is_empty() {
        let typeface = Typeface::from_path_or_builtin(
            options.font_path.as_deref(),
            options.watermark_font_size,
        );
        draw_watermark(&mut canvas, &typeface, options);
        return (DynamicImage::ImageRgba8(canvas), layout_report);
    }

    (
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).into_rgb8()),
        layout_report,
    )
}

fn opaque(color: Color) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

fn paint_background<R: Rng + ?Sized>(
    canvas: &mut RgbaImage,
    options: &TextImageOptions,
    rng: &mut R,
) {
    let (width, height) = canvas.dimensions();
    if options.add_gradient {
        let gradient = create_gradient(
            width,
            height,
            options.gradient_start_color,
            options.gradient_end_color,
            options.gradient_direction,
        );
        blend(canvas, &gradient, GRADIENT_BLEND_FACTOR);
    }
    if options.add_texture {
        let texture = create_texture(width, height, options.texture_intensity, rng);
        blend(
            canvas,
            &texture,
            TEXTURE_BLEND_SCALE * options.texture_intensity,
        );
    }
}

fn draw_lines(
    canvas: &mut RgbaImage,
    layout: &TextLayout,
    options: &TextImageOptions,
) -> Vec<LineReport> {
    let geometry = layout.geometry;
    let outline_offsets = outline_offsets(options.outline_width);
    let outline_color = outline_color(options);
    let strikethrough_thickness = (geometry.font_size / 15).max(1);
    let mut line_reports = Vec::with_capacity(layout.lines.len());

    for (line_index, (line, &line_width)) in layout.lines.iter().zip(&layout.line_widths).enumerate()
    {
        let x_pos = line_start_x(
            options.text_alignment,
            geometry.width,
            geometry.padding,
            line_width,
        );
        let y_pos = geometry.padding as i32 + line_index as i32 * geometry.line_height as i32;
        let mut line_report = LineReport::new(x_pos, y_pos, line_width, geometry.line_height);
        let mut cursor_x = x_pos;

        for WordToken { text, style } in line {
            let typeface = layout.fonts.for_style(*style);
            let metrics = typeface.measure(text);

            if options.add_outline {
                for (offset_x, offset_y) in outline_offsets.iter() {
                    typeface.draw_text(
                        canvas,
                        cursor_x + offset_x,
                        y_pos + offset_y,
                        text,
                        outline_color,
                    );
                }
            }
            if options.add_shadow {
                draw_shadow(canvas, typeface, cursor_x, y_pos, text, metrics, options);
            }
            typeface.draw_text(canvas, cursor_x, y_pos, text, opaque(options.text_color));
            if *style == TextStyle::Strikethrough {
                draw_horizontal_line(
                    canvas,
                    cursor_x,
                    cursor_x + metrics.width,
                    y_pos + metrics.height / 2,
                    strikethrough_thickness,
                    opaque(options.text_color),
                );
            }

            line_report.push_word(WordBox {
                word: text.clone(),
                x: cursor_x,
                y: y_pos,
                width: metrics.width,
                height: metrics.height,
                style: *style,
            });
            cursor_x += metrics.width + typeface.measure(" ").width;
        }

        line_reports.push(line_report);
    }

    line_reports
}

/// The four axis offsets of an outline, plus the four diagonals when it is wider than one pixel.
pub fn outline_offsets(outline_width: i32) -> Vec<(i32, i32)> {
    let mut offsets = vec![
        (-outline_width, 0),
        (outline_width, 0),
        (0, -outline_width),
        (0, outline_width),
    ];
    if outline_width > 1 {
        offsets.extend([
            (-outline_width, -outline_width),
            (outline_width, outline_width),
            (-outline_width, outline_width),
            (outline_width, -outline_width),
        ]);
    }
    offsets
}

/// The outline color moved toward the background color as the opacity drops below one.
fn outline_color(options: &TextImageOptions) -> Rgba<u8> {
    if options.outline_opacity >= 1.0 {
        return opaque(options.outline_color);
    }
    let opacity = options.outline_opacity;
    let mix = |channel: usize| {
        (options.outline_color[channel] as f64 * opacity
            + options.bg_color[channel] as f64 * (1.0 - opacity)) as u8
    };
    Rgba([mix(0), mix(1), mix(2), 255])
}

fn draw_shadow(
    canvas: &mut RgbaImage,
    typeface: &Typeface,
    x: i32,
    y: i32,
    text: &str,
    metrics: TextMetrics,
    options: &TextImageOptions,
) {
    let blur = options.shadow_blur as i32;
    let shadow_width = (metrics.width + 2 * blur).max(0) as u32;
    let shadow_height = (metrics.height + 2 * blur).max(0) as u32;
    if shadow_width == 0 || shadow_height == 0 {
        return;
    }

    // Transparent pixels carry the shadow color so that blurring only spreads the alpha
    let [red, green, blue] = options.shadow_color;
    let mut shadow = RgbaImage::from_pixel(shadow_width, shadow_height, Rgba([red, green, blue, 0]));
    typeface.draw_text(&mut shadow, blur, blur, text, Rgba([red, green, blue, 255]));
    if blur > 0 {
        shadow = imageops::blur(&shadow, blur as f32);
    }

    let (offset_x, offset_y) = options.shadow_offset;
    imageops::overlay(
        canvas,
        &shadow,
        (x + offset_x - blur) as i64,
        (y + offset_y - blur) as i64,
    );
}

/// Fills the rows of a line `thickness` pixels thick centered on `y`, from `x_start` to `x_end`
/// inclusive, clipped to the canvas.
fn draw_horizontal_line(
    canvas: &mut RgbaImage,
    x_start: i32,
    x_end: i32,
    y: i32,
    thickness: u32,
    color: Rgba<u8>,
) {
    let (canvas_width, canvas_height) = (canvas.width() as i32, canvas.height() as i32);
    let top = y - thickness as i32 / 2;
    for row in top.max(0)..(top + thickness as i32).min(canvas_height) {
        for column in x_start.max(0)..=x_end.min(canvas_width - 1) {
            canvas.put_pixel(column as u32, row as u32, color);
        }
    }
}

/// A copy of the canvas surrounded on every side by `border_width` pixels of `border_color`.
pub fn expand_border(canvas: &RgbaImage, border_width: u32, border_color: Color) -> RgbaImage {
    let mut bordered = RgbaImage::from_pixel(
        canvas.width() + 2 * border_width,
        canvas.height() + 2 * border_width,
        opaque(border_color),
    );
    imageops::replace(
        &mut bordered,
        canvas,
        border_width as i64,
        border_width as i64,
    );
    bordered
}

/// The top-left corner of a watermark of the given size. Corners are inset by `WATERMARK_INSET`,
/// the center position is not.
pub fn watermark_origin(
    watermark_position: WatermarkPosition,
    canvas_width: u32,
    canvas_height: u32,
    watermark_metrics: TextMetrics,
) -> (i32, i32) {
    let right = canvas_width as i32 - watermark_metrics.width - WATERMARK_INSET;
    let bottom = canvas_height as i32 - watermark_metrics.height - WATERMARK_INSET;
    match watermark_position {
        WatermarkPosition::TopLeft => (WATERMARK_INSET, WATERMARK_INSET),
        WatermarkPosition::TopRight => (right, WATERMARK_INSET),
        WatermarkPosition::BottomLeft => (WATERMARK_INSET, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
        WatermarkPosition::Center => (
            (canvas_width as i32 - watermark_metrics.width).div_euclid(2),
            (canvas_height as i32 - watermark_metrics.height).div_euclid(2),
        ),
    }
}

fn draw_watermark(canvas: &mut RgbaImage, typeface: &Typeface, options: &TextImageOptions) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let metrics = typeface.measure(&options.watermark_text);
    let (x, y) = watermark_origin(
        options.watermark_position,
        canvas_width,
        canvas_height,
        metrics,
    );
    let alpha = (255.0 * options.watermark_opacity).clamp(0.0, 255.0) as u8;
    let [red, green, blue] = options.watermark_color;

    let mut watermark = RgbaImage::new(canvas_width, canvas_height);
    typeface.draw_text(
        &mut watermark,
        x,
        y,
        &options.watermark_text,
        Rgba([red, green, blue, alpha]),
    );
    imageops::overlay(canvas, &watermark, 0, 0);
}

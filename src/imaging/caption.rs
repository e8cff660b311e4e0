//! Caption overlay rendering.
//!
//! Draws the resolved caption lines onto a resized photo. Text color adapts
//! to the photo: the mean color of the bottom tenth of the image is reduced
//! to a luminance, and bright backgrounds get black text with a white
//! outline while dark ones get the inverse. The bottom band is sampled for
//! both caption positions, so a top caption's contrast is still chosen by
//! the bottom of the photo.
//!
//! Each line is painted twice: the outline color at every offset in a 5x5
//! neighborhood, then the fill color on top. Pixels falling outside the
//! image are clipped individually.

use crate::config::{CaptionConfig, CaptionPosition};
use crate::imaging::calculations::{self, CAPTION_INSET_X};
use crate::imaging::font::FontHandle;
use crate::types::CaptionMetadata;
use image::{Rgb, RgbImage};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Outline radius in pixels. The outline pass covers every offset in
/// `[-2, 2] x [-2, 2]`.
const OUTLINE_RADIUS: i64 = 2;

/// Mean RGB of the bottom tenth of the image.
fn sample_bottom_band(image: &RgbImage) -> (f64, f64, f64) {
    let height = image.height();
    let band_rows = (height / 10).max(1).min(height);
    let band_start = height - band_rows;

    let mut sums = (0.0, 0.0, 0.0);
    let mut count = 0u64;
    for y in band_start..height {
        for x in 0..image.width() {
            let Rgb([r, g, b]) = *image.get_pixel(x, y);
            sums.0 += r as f64;
            sums.1 += g as f64;
            sums.2 += b as f64;
            count += 1;
        }
    }
    (
        sums.0 / count as f64,
        sums.1 / count as f64,
        sums.2 / count as f64,
    )
}

/// Pick (fill, outline) colors from the sampled background.
fn caption_colors(image: &RgbImage) -> (Rgb<u8>, Rgb<u8>) {
    let (r, g, b) = sample_bottom_band(image);
    if calculations::relative_luminance(r, g, b) > 0.5 {
        (BLACK, WHITE)
    } else {
        (WHITE, BLACK)
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_line(
    image: &mut RgbImage,
    pixels: &[(i64, i64)],
    origin_x: i64,
    origin_y: i64,
    fill: Rgb<u8>,
    outline: Rgb<u8>,
) {
    for dy in -OUTLINE_RADIUS..=OUTLINE_RADIUS {
        for dx in -OUTLINE_RADIUS..=OUTLINE_RADIUS {
            for &(px, py) in pixels {
                put_pixel_clipped(image, origin_x + px + dx, origin_y + py + dy, outline);
            }
        }
    }
    for &(px, py) in pixels {
        put_pixel_clipped(image, origin_x + px, origin_y + py, fill);
    }
}

/// Draw the caption block onto the image, in place.
pub fn draw_caption(
    image: &mut RgbImage,
    metadata: &CaptionMetadata,
    config: &CaptionConfig,
    font: &FontHandle,
) {
    let lines = metadata.lines();
    if lines.is_empty() {
        return;
    }

    let (fill, outline) = caption_colors(image);
    let block_y = calculations::caption_origin_y(
        config.position,
        image.height(),
        lines.len(),
        config.font_size,
    );
    let line_height = calculations::line_height(config.font_size);

    for (index, line) in lines.iter().enumerate() {
        let pixels = font.rasterize_line(line, config.font_size);
        let line_y = block_y + (index as f64 * line_height) as i64;
        draw_line(image, &pixels, CAPTION_INSET_X, line_y, fill, outline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
        RgbImage::from_pixel(width, height, color)
    }

    fn caption(timestamp: &str, place: Option<&str>) -> CaptionMetadata {
        CaptionMetadata {
            timestamp: timestamp.to_string(),
            place: place.map(String::from),
        }
    }

    fn config(position: CaptionPosition) -> CaptionConfig {
        CaptionConfig {
            position,
            ..Default::default()
        }
    }

    fn count_color(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn bright_background_gets_black_text() {
        let mut image = uniform(640, 400, WHITE);
        draw_caption(
            &mut image,
            &caption("2024-01-01 12:00", None),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );
        assert!(count_color(&image, BLACK) > 0);
    }

    #[test]
    fn dark_background_gets_white_text() {
        let mut image = uniform(640, 400, BLACK);
        draw_caption(
            &mut image,
            &caption("2024-01-01 12:00", None),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );
        assert!(count_color(&image, WHITE) > 0);
    }

    #[test]
    fn top_caption_contrast_still_keyed_to_bottom_band() {
        // Black upper area, white bottom band: the bottom sample is bright,
        // so even a top caption draws black text.
        let mut image = uniform(640, 400, BLACK);
        for y in 360..400 {
            for x in 0..640 {
                image.put_pixel(x, y, WHITE);
            }
        }
        draw_caption(
            &mut image,
            &caption("2024-01-01 12:00", None),
            &config(CaptionPosition::Top),
            &FontHandle::Builtin,
        );

        // The top caption region now contains black-on-black fill plus a
        // white outline; the outline is the visible evidence.
        let mut white_in_top = 0;
        for y in 0..200u32 {
            for x in 0..640u32 {
                if *image.get_pixel(x, y) == WHITE {
                    white_in_top += 1;
                }
            }
        }
        assert!(white_in_top > 0);
    }

    #[test]
    fn outline_color_contrasts_fill() {
        let mut image = uniform(640, 400, Rgb([128, 128, 128]));
        draw_caption(
            &mut image,
            &caption("1", None),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );
        // Both fill and outline pixels must be present.
        let black = count_color(&image, BLACK);
        let white = count_color(&image, WHITE);
        assert!(black > 0 && white > 0);
        // Outline covers a 5x5 neighborhood, so it dominates the fill.
        assert!(black.max(white) > black.min(white));
    }

    #[test]
    fn two_lines_render_lower_than_one() {
        let mut one = uniform(640, 400, WHITE);
        let mut two = uniform(640, 400, WHITE);
        draw_caption(
            &mut one,
            &caption("2024-01-01", None),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );
        draw_caption(
            &mut two,
            &caption("2024-01-01", Some("Pittsburgh")),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );

        let top_black_row = |image: &RgbImage| {
            (0..image.height()).find(|&y| {
                (0..image.width()).any(|x| *image.get_pixel(x, y) == BLACK)
            })
        };
        // The two-line block starts one line height higher.
        assert!(top_black_row(&two).unwrap() < top_black_row(&one).unwrap());
    }

    #[test]
    fn tiny_image_clips_instead_of_panicking() {
        let mut image = uniform(8, 8, WHITE);
        draw_caption(
            &mut image,
            &caption("2024-01-01 12:00", Some("Somewhere")),
            &config(CaptionPosition::Bottom),
            &FontHandle::Builtin,
        );
    }

    #[test]
    fn sample_band_is_bottom_tenth() {
        // 300 rows: band is rows 270..300. Paint them white, rest black.
        let mut image = uniform(100, 300, BLACK);
        for y in 270..300 {
            for x in 0..100 {
                image.put_pixel(x, y, WHITE);
            }
        }
        let (r, g, b) = sample_bottom_band(&image);
        assert!((r - 255.0).abs() < 1e-9);
        assert!((g - 255.0).abs() < 1e-9);
        assert!((b - 255.0).abs() < 1e-9);
    }

    #[test]
    fn sample_band_of_short_image_uses_last_row() {
        let mut image = uniform(10, 5, BLACK);
        for x in 0..10 {
            image.put_pixel(x, 4, WHITE);
        }
        let (r, _, _) = sample_bottom_band(&image);
        assert!((r - 255.0).abs() < 1e-9);
    }
}

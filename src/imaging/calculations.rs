//! Pure calculation functions for resizing and caption layout.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::config::CaptionPosition;

/// Horizontal inset of the caption block from the left edge, pixels.
pub const CAPTION_INSET_X: i64 = 100;
/// Vertical margin between the caption block and the nearest edge, pixels.
pub const CAPTION_MARGIN_Y: i64 = 100;

/// Calculate dimensions that fit inside a target box, preserving aspect ratio.
///
/// Whichever of width/height has the larger source/target ratio is the
/// *binding* dimension: it lands exactly on its target, and the other is
/// derived through the aspect ratio (so it never exceeds its own target).
///
/// # Examples
/// ```
/// # use frameprep::imaging::fit_dimensions;
/// // 4000x3000 into 1280x800: width ratio 3.125 > height ratio 3.75? no —
/// // height binds, so height == 800 and width is derived
/// assert_eq!(fit_dimensions((4000, 3000), (1280, 800)), (1067, 800));
///
/// // 4000x1000 into 1280x800: width binds
/// assert_eq!(fit_dimensions((4000, 1000), (1280, 800)), (1280, 320));
/// ```
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let aspect = src_w as f64 / src_h as f64;
    let width_ratio = src_w as f64 / tgt_w as f64;
    let height_ratio = src_h as f64 / tgt_h as f64;

    if width_ratio > height_ratio {
        // Width is the binding dimension
        let w = tgt_w;
        let h = (w as f64 / aspect).round() as u32;
        (w, h)
    } else {
        // Height is the binding dimension
        let h = tgt_h;
        let w = (h as f64 * aspect).round() as u32;
        (w, h)
    }
}

/// Relative luminance of an RGB color, in `0.0..=1.0`.
pub fn relative_luminance(r: f64, g: f64, b: f64) -> f64 {
    (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
}

/// Caption line height for a given font size.
pub fn line_height(font_size: u32) -> f64 {
    font_size as f64 * 1.2
}

/// Vertical origin of the caption block.
///
/// Bottom-anchored captions reserve one line height per line plus the margin;
/// top-anchored captions start at the margin. May be negative for pathological
/// (tiny image / huge font) combinations — drawing clips per pixel.
pub fn caption_origin_y(
    position: CaptionPosition,
    image_height: u32,
    line_count: usize,
    font_size: u32,
) -> i64 {
    match position {
        CaptionPosition::Bottom => {
            image_height as i64
                - (line_count as f64 * line_height(font_size)) as i64
                - CAPTION_MARGIN_Y
        }
        CaptionPosition::Top => CAPTION_MARGIN_Y,
    }
}

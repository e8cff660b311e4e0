//! Caption font loading and rasterization.
//!
//! Fonts resolve through a fixed chain: the configured path first, then a
//! short list of well-known system fonts, and finally a builtin 5x7 bitmap
//! face that is always available. The builtin face ignores the configured
//! font size and renders at its native scale, so captions stay legible but
//! small when no TrueType font can be found.

use rusttype::{Font, Scale, point};
use std::path::Path;

/// System fonts probed when no font path is configured (or the configured
/// one fails to load). First hit wins.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Native glyph cell of the builtin face: 5 columns, 7 rows, 1 column gap.
const BUILTIN_GLYPH_WIDTH: i64 = 5;
const BUILTIN_GLYPH_ADVANCE: i64 = 6;
const BUILTIN_GLYPH_HEIGHT: i64 = 7;

/// A loaded caption font.
pub enum FontHandle {
    Truetype(Font<'static>),
    Builtin,
}

impl FontHandle {
    /// Resolve a font: configured path, then system fonts, then builtin.
    ///
    /// Never fails; the builtin face is the floor of the chain.
    pub fn resolve(configured: Option<&Path>) -> FontHandle {
        if let Some(path) = configured {
            match load_truetype(path) {
                Some(font) => return FontHandle::Truetype(font),
                None => log::warn!(
                    "could not load configured font {}; trying system fonts",
                    path.display()
                ),
            }
        }

        for candidate in SYSTEM_FONT_PATHS {
            if let Some(font) = load_truetype(Path::new(candidate)) {
                log::debug!("using system font {candidate}");
                return FontHandle::Truetype(font);
            }
        }

        log::warn!("no TrueType font available; using builtin bitmap font");
        FontHandle::Builtin
    }

    /// Rasterize one line of text as pixel offsets relative to the line's
    /// top-left origin.
    ///
    /// Coverage is binarized (a pixel is either text or not) so outline and
    /// fill passes paint the same shape.
    pub fn rasterize_line(&self, text: &str, font_size: u32) -> Vec<(i64, i64)> {
        match self {
            FontHandle::Truetype(font) => rasterize_truetype(font, text, font_size),
            FontHandle::Builtin => rasterize_builtin(text),
        }
    }
}

fn load_truetype(path: &Path) -> Option<Font<'static>> {
    let bytes = std::fs::read(path).ok()?;
    Font::try_from_vec(bytes)
}

fn rasterize_truetype(font: &Font<'static>, text: &str, font_size: u32) -> Vec<(i64, i64)> {
    let scale = Scale::uniform(font_size as f32);
    let ascent = font.v_metrics(scale).ascent;

    let mut pixels = Vec::new();
    for glyph in font.layout(text, scale, point(0.0, ascent)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            if coverage > 0.5 {
                pixels.push((bb.min.x as i64 + gx as i64, bb.min.y as i64 + gy as i64));
            }
        });
    }
    pixels
}

fn rasterize_builtin(text: &str) -> Vec<(i64, i64)> {
    let mut pixels = Vec::new();
    for (index, ch) in text.chars().enumerate() {
        let glyph = builtin_glyph(ch);
        let origin_x = index as i64 * BUILTIN_GLYPH_ADVANCE;
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..BUILTIN_GLYPH_HEIGHT {
                if bits >> row & 1 == 1 {
                    pixels.push((origin_x + col as i64, row));
                }
            }
        }
    }
    pixels
}

/// Column bitmaps for one builtin glyph. Non-ASCII and control characters
/// render as the replacement box.
fn builtin_glyph(ch: char) -> [u8; BUILTIN_GLYPH_WIDTH as usize] {
    let code = ch as usize;
    if (0x20..=0x7E).contains(&code) {
        BUILTIN_FONT[code - 0x20]
    } else {
        // Filled box for anything outside printable ASCII
        [0x7F, 0x41, 0x41, 0x41, 0x7F]
    }
}

/// Classic 5x7 dot-matrix face, ASCII 0x20..=0x7E. Each glyph is five column
/// bytes; bit 0 is the top row.
#[rustfmt::skip]
const BUILTIN_FONT: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x10, 0x08, 0x08, 0x10, 0x08], // '~'
];

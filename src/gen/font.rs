//! Best-effort font lookup and text drawing for placeholder rendering.
//!
//! Placeholder output must always be producible, so font resolution is a
//! two-tier lookup that never fails: try a short ordered list of well-known
//! system TrueType fonts, and when none parses fall back to a built-in 5x7
//! bitmap font scaled to the requested size.

use ab_glyph::{point, Font as _, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};

/// Ordered candidate paths for the system font tier.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Bitmap glyph cell geometry: 5 columns, 7 rows, one column of spacing.
const BITMAP_GLYPH_COLS: u32 = 5;
const BITMAP_GLYPH_ROWS: u32 = 7;
const BITMAP_GLYPH_ADVANCE: u32 = BITMAP_GLYPH_COLS + 1;
const BITMAP_CELL_HEIGHT: u32 = BITMAP_GLYPH_ROWS + 1;

/// A resolved font resource.
///
/// Either a parsed system TrueType font or the built-in bitmap tier.
pub enum Font {
    /// A system TrueType font rasterized through `ab_glyph`.
    TrueType(FontVec),
    /// The built-in 5x7 bitmap font, scaled by integer factors.
    Bitmap,
}

impl Font {
    /// Resolve a font, preferring the system tier.
    ///
    /// Walks [`SYSTEM_FONT_PATHS`] in order and returns the first font that
    /// can be read and parsed. Falls back to [`Font::Bitmap`] otherwise;
    /// this function never fails.
    pub fn load() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(data) {
                    log::debug!("Using system font: {}", path);
                    return Font::TrueType(font);
                }
            }
        }
        log::debug!("No system font available, using built-in bitmap font");
        Font::Bitmap
    }

    /// Whether the system font tier was found.
    pub fn is_system(&self) -> bool {
        matches!(self, Font::TrueType(_))
    }

    /// Height of one text line at `size` pixels, excluding extra spacing.
    pub fn line_height(&self, size: f32) -> f32 {
        match self {
            Font::TrueType(font) => font.as_scaled(PxScale::from(size)).height(),
            Font::Bitmap => (BITMAP_CELL_HEIGHT * bitmap_scale(size)) as f32,
        }
    }

    /// Advance width of `text` rendered on a single line at `size` pixels.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            Font::TrueType(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                text.chars()
                    .map(|c| scaled.h_advance(scaled.glyph_id(c)))
                    .sum()
            }
            Font::Bitmap => {
                let advance = BITMAP_GLYPH_ADVANCE * bitmap_scale(size);
                (text.chars().count() as u32 * advance) as f32
            }
        }
    }

    /// Draw a single line of `text` onto `canvas`.
    ///
    /// `(x, y)` is the top-left corner of the line. Pixels falling outside
    /// the canvas are clipped.
    pub fn draw_text(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        size: f32,
        color: Rgb<u8>,
        text: &str,
    ) {
        match self {
            Font::TrueType(font) => draw_truetype(font, canvas, x, y, size, color, text),
            Font::Bitmap => draw_bitmap(canvas, x, y, size, color, text),
        }
    }
}

/// Integer scale factor for the bitmap tier at a nominal pixel size.
fn bitmap_scale(size: f32) -> u32 {
    ((size / BITMAP_CELL_HEIGHT as f32).round() as i64).max(1) as u32
}

fn draw_truetype(
    font: &FontVec,
    canvas: &mut RgbImage,
    x: i32,
    y: i32,
    size: f32,
    color: Rgb<u8>,
    text: &str,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let mut caret = point(x as f32, y as f32 + scaled.ascent());

    for c in text.chars() {
        let mut glyph = scaled.scaled_glyph(c);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend_pixel(canvas, px, py, color, coverage);
            });
        }
    }
}

fn draw_bitmap(canvas: &mut RgbImage, x: i32, y: i32, size: f32, color: Rgb<u8>, text: &str) {
    let scale = bitmap_scale(size) as i32;
    let mut caret = x;

    for c in text.chars() {
        let glyph = bitmap_glyph(c);
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..BITMAP_GLYPH_ROWS {
                if bits & (1 << row) != 0 {
                    fill_rect(
                        canvas,
                        caret + col as i32 * scale,
                        y + row as i32 * scale,
                        scale,
                        color,
                    );
                }
            }
        }
        caret += BITMAP_GLYPH_ADVANCE as i32 * scale;
    }
}

/// Fill a scale-by-scale square, clipped to the canvas.
fn fill_rect(canvas: &mut RgbImage, x: i32, y: i32, side: i32, color: Rgb<u8>) {
    for dy in 0..side {
        for dx in 0..side {
            blend_pixel(canvas, x + dx, y + dy, color, 1.0);
        }
    }
}

/// Alpha-blend `color` onto the canvas at `(x, y)` with the given coverage.
fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let bg = pixel.0[i] as f32;
        let fg = color.0[i] as f32;
        pixel.0[i] = (bg + (fg - bg) * coverage).round() as u8;
    }
}

/// Look up the bitmap glyph for a character.
///
/// Characters outside the printable ASCII range render as `?`.
fn bitmap_glyph(c: char) -> &'static [u8; 5] {
    let index = match c {
        ' '..='~' => c as usize - 0x20,
        _ => b'?' as usize - 0x20,
    };
    &FONT_5X7[index]
}

/// Built-in 5x7 ASCII font, one glyph per printable character 0x20..=0x7E.
///
/// Column-major: each byte is one column, bit 0 is the top row.
#[rustfmt::skip]
const FONT_5X7: [[u8; 5]; 95] = [
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
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // '*'
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
    [0x00, 0x08, 0x14, 0x22, 0x41], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x41, 0x22, 0x14, 0x08, 0x00], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x01, 0x01], // 'F'
    [0x3E, 0x41, 0x41, 0x51, 0x32], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x03, 0x04, 0x78, 0x04, 0x03], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x00, 0x7F, 0x41, 0x41], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x08, 0x14, 0x54, 0x54, 0x3C], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x00, 0x7F, 0x10, 0x28, 0x44], // 'k'
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
    [0x08, 0x04, 0x08, 0x10, 0x08], // '~'
];

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};

pub(crate) const GLYPH_SIZE: i32 = 8;
const PLACEHOLDER: char = '?';

pub(crate) fn is_renderable(ch: char) -> bool {
    ch.is_whitespace() || BASIC_FONTS.get(ch).is_some()
}

pub(crate) fn missing_chars(text: &str) -> Vec<char> {
    let mut missing = Vec::new();
    for ch in text.chars() {
        if !is_renderable(ch) && !missing.contains(&ch) {
            missing.push(ch);
        }
    }
    missing
}

/// Draws `text` with its baseline at `baseline`, glyph cells scaled by
/// `scale`. Anything outside the image is clipped. Characters without a
/// glyph are drawn as `?`.
pub(crate) fn draw_line(
    image: &mut RgbImage,
    text: &str,
    x: i32,
    baseline: i32,
    scale: u32,
    color: Rgb<u8>,
) {
    let scale = scale.max(1) as i32;
    let cell = GLYPH_SIZE * scale;
    let top = baseline - cell;
    let mut pen_x = x;
    for ch in text.chars() {
        let glyph = if ch.is_whitespace() {
            None
        } else {
            BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get(PLACEHOLDER))
        };
        if let Some(rows) = glyph {
            draw_glyph(image, &rows, pen_x, top, scale, color);
        }
        pen_x += cell;
    }
}

fn draw_glyph(image: &mut RgbImage, rows: &[u8; 8], x: i32, y: i32, scale: i32, color: Rgb<u8>) {
    let (width, height) = (image.width() as i32, image.height() as i32);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            if bits & (1 << col) == 0 {
                continue;
            }
            let px = x + col * scale;
            let py = y + row as i32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    let (tx, ty) = (px + dx, py + dy);
                    if tx >= 0 && ty >= 0 && tx < width && ty < height {
                        image.put_pixel(tx as u32, ty as u32, color);
                    }
                }
            }
        }
    }
}

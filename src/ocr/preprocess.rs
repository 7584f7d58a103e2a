use image::{GrayImage, Luma, RgbImage};

/// Grayscale followed by a 3×3 median blur, which knocks out salt-and-pepper
/// noise before Tesseract binarizes the page.
pub(crate) fn preprocess_for_ocr(image: &RgbImage) -> GrayImage {
    median_blur_3x3(&to_luma(image))
}

fn to_luma(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut luma = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let value = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
        luma.put_pixel(x, y, Luma([value]));
    }
    luma
}

fn median_blur_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut output = GrayImage::new(width, height);
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let mut window = [0u8; 9];
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut idx = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let sx = (x + dx).clamp(0, max_x) as u32;
                    let sy = (y + dy).clamp(0, max_y) as u32;
                    window[idx] = image.get_pixel(sx, sy)[0];
                    idx += 1;
                }
            }
            window.sort_unstable();
            output.put_pixel(x as u32, y as u32, Luma([window[4]]));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn luma_uses_bt601_weights() {
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert_eq!(to_luma(&image).get_pixel(0, 0)[0], 76);
    }

    #[test]
    fn median_removes_isolated_specks() {
        let mut image = RgbImage::from_pixel(5, 5, Rgb([255, 255, 255]));
        image.put_pixel(2, 2, Rgb([0, 0, 0]));
        let cleaned = preprocess_for_ocr(&image);
        assert!(cleaned.pixels().all(|pixel| pixel[0] == 255));
    }

    #[test]
    fn median_keeps_solid_strokes() {
        let mut image = RgbImage::from_pixel(7, 7, Rgb([255, 255, 255]));
        for y in 0..7 {
            for x in 2..5 {
                image.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let cleaned = preprocess_for_ocr(&image);
        assert_eq!(cleaned.get_pixel(3, 3)[0], 0);
        assert_eq!(cleaned.get_pixel(0, 3)[0], 255);
        assert_eq!(cleaned.dimensions(), (7, 7));
    }

    #[test]
    fn single_pixel_image_is_handled() {
        let image = RgbImage::from_pixel(1, 1, Rgb([10, 10, 10]));
        assert_eq!(preprocess_for_ocr(&image).get_pixel(0, 0)[0], 10);
    }
}

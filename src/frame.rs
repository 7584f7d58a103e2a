use anyhow::{anyhow, Context, Result};
use image::{GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";

/// Byte order of the three colour channels in a raw pixel buffer. Images are
/// RGB everywhere inside the crate; BGR only exists at raw I/O boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl FromStr for ChannelOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(anyhow!(
                "invalid channel order '{}' (expected rgb or bgr)",
                other
            )),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOrder::Rgb => f.write_str("rgb"),
            ChannelOrder::Bgr => f.write_str("bgr"),
        }
    }
}

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image: {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("failed to load image: {}", path.display()))
}

/// Decodes any format the `image` crate understands into 8-bit RGB. Alpha is
/// dropped.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let decoded = image::load_from_memory(bytes).with_context(|| "failed to decode image")?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(anyhow!("image has no pixels ({}x{})", width, height));
    }
    Ok(decoded.to_rgb8())
}

pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    let mime = kind.mime_type();
    mime.starts_with("image/").then_some(mime)
}

/// Uploads are limited to the formats the web form offers.
pub fn is_supported_upload(mime: &str) -> bool {
    matches!(mime, PNG_MIME | JPEG_MIME | "image/jpg")
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .with_context(|| "failed to encode PNG")?;
    Ok(bytes)
}

pub fn rgb_from_raw(width: u32, height: u32, bytes: &[u8], order: ChannelOrder) -> Result<RgbImage> {
    let expected = width as usize * height as usize * 3;
    if bytes.len() != expected {
        return Err(anyhow!(
            "raw buffer has {} bytes, expected {} for {}x{} {}",
            bytes.len(),
            expected,
            width,
            height,
            order
        ));
    }
    let mut data = bytes.to_vec();
    if order == ChannelOrder::Bgr {
        swap_red_blue(&mut data);
    }
    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| anyhow!("failed to build {}x{} image from raw buffer", width, height))
}

pub fn rgb_into_raw(image: &RgbImage, order: ChannelOrder) -> Vec<u8> {
    let mut data = image.as_raw().clone();
    if order == ChannelOrder::Bgr {
        swap_red_blue(&mut data);
    }
    data
}

fn swap_red_blue(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

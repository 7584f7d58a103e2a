mod preprocess;
mod tesseract;

use anyhow::{Context, Result};
use image::RgbImage;
use std::io::Write;
use tracing::{debug, info};

use crate::languages::LanguageRegistry;

pub use tesseract::{list_tesseract_languages, normalize_ocr_languages};

/// Pulls raw text out of an image. OCR noise is returned as-is.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, image: &RgbImage, languages: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct Tesseract {
    registry: LanguageRegistry,
}

impl Tesseract {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self { registry }
    }
}

impl TextExtractor for Tesseract {
    fn extract(&self, image: &RgbImage, languages: &str) -> Result<String> {
        let installed = match list_tesseract_languages() {
            Ok(list) => Some(list),
            Err(err) => {
                debug!("could not list tesseract languages: {}", err);
                None
            }
        };
        let languages = normalize_ocr_languages(languages, &self.registry, installed.as_deref())?;

        let prepared = preprocess::preprocess_for_ocr(image);
        let tmp = write_temp_png(&prepared)?;

        info!(
            "ocr: tesseract -l {} on {}x{}",
            languages,
            image.width(),
            image.height()
        );
        let text = tesseract::run_tesseract_text(tmp.path(), &languages)?;
        info!("ocr: extracted {} chars", text.chars().count());
        Ok(text)
    }
}

/// Tesseract reads from disk; the file lives as long as the returned handle.
fn write_temp_png(image: &image::GrayImage) -> Result<tempfile::NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .with_context(|| "failed to create temp file for OCR")?;
    image
        .write_to(&mut tmp, image::ImageFormat::Png)
        .with_context(|| "failed to write temp image for OCR")?;
    tmp.flush()
        .with_context(|| "failed to flush temp image for OCR")?;
    Ok(tmp)
}

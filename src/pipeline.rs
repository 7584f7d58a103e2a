//! One request from image bytes to a rendered image: decode, OCR, translate,
//! render. Callers hand in validated inputs and get a plain result back.

use anyhow::Result;
use thiserror::Error;
use tracing::info;

use crate::frame;
use crate::ocr::TextExtractor;
use crate::providers::Provider;
use crate::render::{self, RenderConfig, RenderError, RenderedImage};
use crate::translator::{TranslateOptions, Translator};

/// Failure of one pipeline stage. Callers map stages to their own error
/// surfaces (exit codes, HTTP statuses).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid image: {0:#}")]
    Decode(anyhow::Error),
    #[error("text extraction failed: {0:#}")]
    Ocr(anyhow::Error),
    #[error("{0:#}")]
    Translate(anyhow::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone)]
pub struct PipelineRequest<'a> {
    pub image_bytes: &'a [u8],
    /// OCR hints, `+`-joined (`"hin+kan"`).
    pub ocr_languages: &'a str,
    pub options: TranslateOptions,
    pub render: RenderConfig,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub detected_text: String,
    pub translated_text: String,
    pub detected_source_lang: Option<String>,
    pub rendered: RenderedImage,
}

impl PipelineOutput {
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        frame::encode_png(&self.rendered.image)
    }
}

pub async fn process<E, P>(
    request: PipelineRequest<'_>,
    extractor: &E,
    translator: &Translator<P>,
) -> Result<PipelineOutput, PipelineError>
where
    E: TextExtractor + ?Sized,
    P: Provider + Clone,
{
    let image = frame::decode_image(request.image_bytes).map_err(PipelineError::Decode)?;
    info!("pipeline: decoded {}x{} image", image.width(), image.height());

    let detected_text = extractor
        .extract(&image, request.ocr_languages)
        .map_err(PipelineError::Ocr)?;

    let translation = translator
        .exec(&detected_text, &request.options)
        .await
        .map_err(PipelineError::Translate)?;

    let rendered = render::render(&image, &translation.text, &request.render)?;
    info!(
        "pipeline: rendered {}x{} ({}, {} lines)",
        rendered.width(),
        rendered.height(),
        rendered.policy,
        rendered.lines.len()
    );

    Ok(PipelineOutput {
        detected_text,
        translated_text: translation.text,
        detected_source_lang: translation.detected_source_lang,
        rendered,
    })
}

/// Renders caller-supplied text without OCR or translation.
pub fn render_only(
    image_bytes: &[u8],
    text: &str,
    config: &RenderConfig,
) -> Result<RenderedImage, PipelineError> {
    let image = frame::decode_image(image_bytes).map_err(PipelineError::Decode)?;
    let rendered = render::render(&image, text, config)?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageRegistry;
    use crate::providers::{ProviderFuture, ProviderResponse, TranslationRequest};
    use crate::render::RenderPolicy;
    use anyhow::anyhow;
    use image::{Rgb, RgbImage};

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract(&self, _image: &RgbImage, _languages: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenOcr;

    impl TextExtractor for BrokenOcr {
        fn extract(&self, _image: &RgbImage, _languages: &str) -> Result<String> {
            Err(anyhow!("tesseract not installed"))
        }
    }

    #[derive(Clone)]
    struct EchoProvider;

    impl Provider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn translate(&self, request: TranslationRequest) -> ProviderFuture {
            Box::pin(async move {
                Ok(ProviderResponse {
                    text: format!("[{}] {}", request.target_lang, request.text),
                    detected_source_lang: Some("hi".to_string()),
                })
            })
        }
    }

    fn translator() -> Translator<EchoProvider> {
        Translator::new(EchoProvider, LanguageRegistry::load().expect("registry"))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([240, 240, 240]));
        frame::encode_png(&image).expect("png")
    }

    fn request(bytes: &[u8], policy: RenderPolicy) -> PipelineRequest<'_> {
        PipelineRequest {
            image_bytes: bytes,
            ocr_languages: "hin+kan",
            options: TranslateOptions::default(),
            render: RenderConfig {
                policy,
                ..RenderConfig::default()
            },
        }
    }

    #[tokio::test]
    async fn runs_every_stage_in_order() {
        let bytes = png(320, 120);
        let output = process(
            request(&bytes, RenderPolicy::Overlay),
            &FixedText("namaste duniya"),
            &translator(),
        )
        .await
        .expect("pipeline");
        assert_eq!(output.detected_text, "namaste duniya");
        assert_eq!(output.translated_text, "[en] namaste duniya");
        assert_eq!(output.detected_source_lang.as_deref(), Some("hi"));
        assert_eq!(output.rendered.lines.len(), 1);
        assert_eq!(output.rendered.image.dimensions(), (320, 120));
        let png = output.png_bytes().expect("png");
        assert_eq!(frame::sniff_image_mime(&png), Some(frame::PNG_MIME));
    }

    #[tokio::test]
    async fn blank_ocr_result_keeps_the_image() {
        let bytes = png(64, 32);
        let output = process(
            request(&bytes, RenderPolicy::Overlay),
            &FixedText("  \n"),
            &translator(),
        )
        .await
        .expect("pipeline");
        assert_eq!(output.translated_text, "");
        assert_eq!(output.rendered.image, frame::decode_image(&bytes).unwrap());
    }

    #[tokio::test]
    async fn ocr_failures_are_reported() {
        let bytes = png(16, 16);
        let err = process(request(&bytes, RenderPolicy::Auto), &BrokenOcr, &translator())
            .await
            .expect_err("ocr failure");
        assert!(matches!(err, PipelineError::Ocr(_)));
        assert_eq!(
            err.to_string(),
            "text extraction failed: tesseract not installed"
        );
    }

    #[tokio::test]
    async fn undecodable_bytes_fail_before_ocr() {
        let err = process(
            request(b"not an image", RenderPolicy::Auto),
            &BrokenOcr,
            &translator(),
        )
        .await
        .expect_err("decode failure");
        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(err.to_string().contains("failed to decode image"));
    }

    #[tokio::test]
    async fn translation_failures_are_tagged() {
        #[derive(Clone)]
        struct DownProvider;

        impl Provider for DownProvider {
            fn name(&self) -> &'static str {
                "down"
            }

            fn translate(&self, _request: TranslationRequest) -> ProviderFuture {
                Box::pin(async { Err(anyhow!("503 Service Unavailable")) })
            }
        }

        let bytes = png(32, 32);
        let translator = Translator::new(DownProvider, LanguageRegistry::load().expect("registry"));
        let err = process(
            request(&bytes, RenderPolicy::Overlay),
            &FixedText("hello"),
            &translator,
        )
        .await
        .expect_err("translation failure");
        assert!(matches!(err, PipelineError::Translate(_)));
        assert!(err.to_string().contains("down translation failed"));
    }

    #[test]
    fn render_only_skips_translation() {
        let bytes = png(200, 100);
        let config = RenderConfig {
            policy: RenderPolicy::Letterbox,
            ..RenderConfig::default()
        };
        let rendered = render_only(&bytes, "", &config).expect("render");
        assert_eq!(rendered.image.dimensions(), (200, 200));
    }
}

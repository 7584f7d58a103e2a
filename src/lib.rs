use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub mod frame;
pub mod languages;
pub mod logging;
pub mod ocr;
mod paths;
pub mod pipeline;
pub mod providers;
pub mod render;
pub mod server;
pub mod settings;
mod test_util;
mod translator;

pub use ocr::{Tesseract, TextExtractor};
pub use pipeline::{PipelineError, PipelineOutput, PipelineRequest};
pub use providers::{GoogleTranslate, Provider, ProviderKind};
pub use render::{RenderConfig, RenderError, RenderIssue, RenderPolicy, RenderedImage};
pub use translator::{ExecutionOutput, TranslateOptions, Translator};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub image: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub ocr_languages: Option<String>,
    pub lang: Option<String>,
    pub source_lang: Option<String>,
    pub policy: Option<String>,
    pub wrap_width: Option<usize>,
    pub font_path: Option<PathBuf>,
    /// Render this text as-is, skipping OCR and translation.
    pub text: Option<String>,
    pub raw: bool,
    pub channel_order: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub show_languages: bool,
    pub show_ocr_languages: bool,
}

/// Settings after command-line overrides.
#[derive(Debug, Clone)]
struct Resolved {
    ocr_languages: String,
    options: TranslateOptions,
    render: RenderConfig,
}

pub async fn run(config: Config) -> Result<String> {
    let settings = settings::load_settings(config.settings_path.as_deref())?;
    let registry = languages::LanguageRegistry::load()?;

    if config.show_languages || config.show_ocr_languages {
        return format_show_output(&config, &registry);
    }

    let image_path = config
        .image
        .as_deref()
        .ok_or_else(|| anyhow!("an input image is required"))?;
    let resolved = apply_overrides(&settings, &config)?;
    let output_path = match config.output.clone() {
        Some(path) => path,
        None => default_output_path(image_path, config.raw, resolved.render.channel_order),
    };
    let bytes = std::fs::read(image_path)
        .with_context(|| format!("failed to read image: {}", image_path.display()))?;

    if let Some(text) = config.text.as_deref() {
        let rendered = pipeline::render_only(&bytes, text, &resolved.render)?;
        let written = write_output(&rendered, &output_path, config.raw, &resolved.render)?;
        let mut lines = format_issues(&rendered);
        lines.push(written);
        return Ok(lines.join("\n"));
    }

    registry.resolve_target(&resolved.options.lang)?;
    registry.resolve_source(&resolved.options.source_lang)?;

    let extractor = Tesseract::new(registry.clone());
    let provider = match settings.translate.provider {
        ProviderKind::Google => GoogleTranslate::new()
            .with_endpoint(settings.translate.endpoint.as_deref())
            .with_timeout(settings.translate.timeout()),
    };
    let translator = Translator::new(provider, registry);

    let output = pipeline::process(
        PipelineRequest {
            image_bytes: &bytes,
            ocr_languages: &resolved.ocr_languages,
            options: resolved.options.clone(),
            render: resolved.render.clone(),
        },
        &extractor,
        &translator,
    )
    .await?;

    let mut lines = vec![
        format!("Detected text: {}", output.detected_text.trim()),
        format!("Translated text: {}", output.translated_text),
    ];
    lines.extend(format_issues(&output.rendered));
    lines.push(write_output(
        &output.rendered,
        &output_path,
        config.raw,
        &resolved.render,
    )?);
    Ok(lines.join("\n"))
}

fn apply_overrides(settings: &settings::Settings, config: &Config) -> Result<Resolved> {
    let mut render = settings.render.clone();
    if let Some(policy) = config.policy.as_deref() {
        render.policy = policy.parse()?;
    }
    if let Some(width) = config.wrap_width {
        if width == 0 {
            return Err(anyhow!("--wrap-width must be positive"));
        }
        render.wrap_width = width;
    }
    if let Some(path) = config.font_path.clone() {
        render.font_path = Some(path);
    }
    if let Some(order) = config.channel_order.as_deref() {
        render.channel_order = order.parse()?;
    }

    let ocr_languages = config
        .ocr_languages
        .clone()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| settings.ocr_languages.clone());
    let options = TranslateOptions {
        lang: config
            .lang
            .clone()
            .unwrap_or_else(|| settings.translate.lang.clone()),
        source_lang: config
            .source_lang
            .clone()
            .unwrap_or_else(|| settings.translate.source_lang.clone()),
    };
    Ok(Resolved {
        ocr_languages,
        options,
        render,
    })
}

fn default_output_path(image: &Path, raw: bool, order: frame::ChannelOrder) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let ext = if raw { order.to_string() } else { "png".to_string() };
    image.with_file_name(format!("{}_translated.{}", stem, ext))
}

fn write_output(
    rendered: &RenderedImage,
    path: &Path,
    raw: bool,
    render: &RenderConfig,
) -> Result<String> {
    let bytes = if raw {
        frame::rgb_into_raw(&rendered.image, render.channel_order)
    } else {
        frame::encode_png(&rendered.image)?
    };
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    if raw {
        Ok(format!(
            "Written: {} ({}x{} {} raw)",
            path.display(),
            rendered.width(),
            rendered.height(),
            render.channel_order
        ))
    } else {
        Ok(format!("Written: {}", path.display()))
    }
}

fn format_issues(rendered: &RenderedImage) -> Vec<String> {
    rendered
        .issues
        .iter()
        .map(|issue| format!("warning: {}", issue))
        .collect()
}

fn format_show_output(config: &Config, registry: &languages::LanguageRegistry) -> Result<String> {
    let mut sections = Vec::new();
    if config.show_languages {
        let lines = registry
            .languages()
            .iter()
            .map(|lang| format!("{}\t{}\t{}", lang.code, lang.name, lang.autonym))
            .collect::<Vec<_>>();
        sections.push(lines.join("\n"));
    }
    if config.show_ocr_languages {
        let installed = ocr::list_tesseract_languages()?;
        sections.push(installed.join("\n"));
    }
    Ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;
    use image::{Rgb, RgbImage};

    fn run_blocking(config: Config) -> Result<String> {
        tokio::runtime::Runtime::new()
            .expect("runtime")
            .block_on(run(config))
    }

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("sign.png");
        let image = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
        std::fs::write(&path, frame::encode_png(&image).unwrap()).unwrap();
        path
    }

    #[test]
    fn text_mode_writes_png_next_to_input() {
        with_temp_home(|home| {
            let image = write_png(home, 300, 150);
            let output = run_blocking(Config {
                image: Some(image.clone()),
                text: Some("HELLO WORLD".to_string()),
                policy: Some("overlay".to_string()),
                ..Config::default()
            })
            .unwrap();
            let expected = home.join("sign_translated.png");
            assert_eq!(output, format!("Written: {}", expected.display()));
            let written = frame::load_image(&expected).unwrap();
            assert_eq!(written.dimensions(), (300, 150));
        });
    }

    #[test]
    fn raw_output_uses_channel_order() {
        with_temp_home(|home| {
            let image = write_png(home, 4, 2);
            let output = run_blocking(Config {
                image: Some(image),
                text: Some(String::new()),
                policy: Some("overlay".to_string()),
                raw: true,
                channel_order: Some("bgr".to_string()),
                ..Config::default()
            })
            .unwrap();
            assert!(output.ends_with("(4x2 bgr raw)"));
            let bytes = std::fs::read(home.join("sign_translated.bgr")).unwrap();
            assert_eq!(bytes.len(), 4 * 2 * 3);
        });
    }

    #[test]
    fn oversized_words_are_reported() {
        with_temp_home(|home| {
            let image = write_png(home, 300, 150);
            let output = run_blocking(Config {
                image: Some(image),
                text: Some("A".repeat(12)),
                policy: Some("overlay".to_string()),
                wrap_width: Some(5),
                ..Config::default()
            })
            .unwrap();
            assert!(output.starts_with("warning: "));
        });
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        with_temp_home(|home| {
            let image = write_png(home, 8, 8);
            let base = Config {
                image: Some(image),
                text: Some("x".to_string()),
                ..Config::default()
            };
            let bad_policy = Config {
                policy: Some("sideways".to_string()),
                ..base.clone()
            };
            assert!(run_blocking(bad_policy).is_err());
            let bad_width = Config {
                wrap_width: Some(0),
                ..base
            };
            assert!(run_blocking(bad_width).is_err());
        });
    }

    #[test]
    fn missing_image_is_an_error() {
        with_temp_home(|_| {
            let err = run_blocking(Config::default()).unwrap_err();
            assert!(err.to_string().contains("input image is required"));
        });
    }

    #[test]
    fn show_languages_lists_the_table() {
        with_temp_home(|_| {
            let output = run_blocking(Config {
                show_languages: true,
                ..Config::default()
            })
            .unwrap();
            assert!(output.lines().any(|line| line == "kn\tKannada\tಕನ್ನಡ"));
            assert!(output.lines().any(|line| line.starts_with("hi\tHindi\t")));
        });
    }

    #[test]
    fn default_output_path_follows_input_stem() {
        assert_eq!(
            default_output_path(Path::new("/tmp/board.jpg"), false, frame::ChannelOrder::Rgb),
            PathBuf::from("/tmp/board_translated.png")
        );
        assert_eq!(
            default_output_path(Path::new("board.jpg"), true, frame::ChannelOrder::Rgb),
            PathBuf::from("board_translated.rgb")
        );
    }
}

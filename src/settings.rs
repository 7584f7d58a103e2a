use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::ChannelOrder;
use crate::paths;
use crate::providers::ProviderKind;
use crate::render::{Color, RenderConfig, RenderPolicy};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ocr_languages: String,
    pub translate: TranslateSettings,
    pub render: RenderConfig,
    pub server_addr: String,
    /// Largest request body the server accepts, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateSettings {
    pub provider: ProviderKind,
    pub lang: String,
    pub source_lang: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl TranslateSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ocr_languages: "hin+kan".to_string(),
            translate: TranslateSettings {
                provider: ProviderKind::Google,
                lang: "en".to_string(),
                source_lang: "auto".to_string(),
                endpoint: None,
                timeout_secs: 30,
            },
            render: RenderConfig::default(),
            server_addr: "127.0.0.1:8080".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    ocr: Option<OcrSection>,
    translate: Option<TranslateSection>,
    render: Option<RenderSection>,
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSection {
    languages: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateSection {
    provider: Option<String>,
    lang: Option<String>,
    source_lang: Option<String>,
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSection {
    policy: Option<String>,
    wrap_width: Option<usize>,
    break_long_words: Option<bool>,
    margin: Option<u32>,
    overlay_line_height: Option<u32>,
    overlay_font_scale: Option<u32>,
    overlay_text_color: Option<String>,
    band_height: Option<u32>,
    band_top_inset: Option<u32>,
    band_line_height: Option<u32>,
    band_font_size: Option<f32>,
    band_text_color: Option<String>,
    band_background_color: Option<String>,
    font_path: Option<String>,
    font_family: Option<String>,
    channel_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    max_upload_bytes: Option<usize>,
}

/// Merges the embedded defaults with every settings file found, in order:
/// `./settings.toml`, `./settings.local.toml`, the same two names in the
/// settings directory, then `extra_path`. Later files win field by field.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    let embedded: SettingsFile =
        toml::from_str(DEFAULT_SETTINGS_TOML).with_context(|| "failed to parse default settings")?;
    settings.merge(embedded)?;
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings
                .merge(parsed)
                .with_context(|| format!("invalid settings in {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(ocr) = incoming.ocr {
            if let Some(languages) = non_blank(ocr.languages) {
                self.ocr_languages = languages;
            }
        }
        if let Some(translate) = incoming.translate {
            if let Some(provider) = non_blank(translate.provider) {
                self.translate.provider = provider.parse()?;
            }
            if let Some(lang) = non_blank(translate.lang) {
                self.translate.lang = lang;
            }
            if let Some(source) = non_blank(translate.source_lang) {
                self.translate.source_lang = source;
            }
            if let Some(endpoint) = non_blank(translate.endpoint) {
                self.translate.endpoint = Some(endpoint);
            }
            if let Some(secs) = translate.timeout_secs {
                if secs > 0 {
                    self.translate.timeout_secs = secs;
                }
            }
        }
        if let Some(render) = incoming.render {
            self.merge_render(render)?;
        }
        if let Some(server) = incoming.server {
            if let Some(addr) = non_blank(server.addr) {
                self.server_addr = addr;
            }
            if let Some(limit) = server.max_upload_bytes {
                if limit == 0 {
                    return Err(anyhow!("server.max_upload_bytes must be positive"));
                }
                self.max_upload_bytes = limit;
            }
        }
        Ok(())
    }

    fn merge_render(&mut self, section: RenderSection) -> Result<()> {
        let render = &mut self.render;
        if let Some(policy) = non_blank(section.policy) {
            render.policy = policy.parse::<RenderPolicy>()?;
        }
        if let Some(width) = section.wrap_width {
            if width == 0 {
                return Err(anyhow!("render.wrap_width must be positive"));
            }
            render.wrap_width = width;
        }
        if let Some(value) = section.break_long_words {
            render.break_long_words = value;
        }
        if let Some(margin) = section.margin {
            render.margin = margin;
        }
        if let Some(height) = section.overlay_line_height {
            render.overlay_line_height = height;
        }
        if let Some(scale) = section.overlay_font_scale {
            if scale > 0 {
                render.overlay_font_scale = scale;
            }
        }
        if let Some(color) = non_blank(section.overlay_text_color) {
            render.overlay_text_color = color.parse::<Color>()?;
        }
        if let Some(height) = section.band_height {
            render.band_height = height;
        }
        if let Some(inset) = section.band_top_inset {
            render.band_top_inset = inset;
        }
        if let Some(height) = section.band_line_height {
            render.band_line_height = height;
        }
        if let Some(size) = section.band_font_size {
            if size > 0.0 {
                render.band_font_size = size;
            }
        }
        if let Some(color) = non_blank(section.band_text_color) {
            render.band_text_color = color.parse::<Color>()?;
        }
        if let Some(color) = non_blank(section.band_background_color) {
            render.band_background_color = color.parse::<Color>()?;
        }
        if let Some(path) = non_blank(section.font_path) {
            render.font_path = Some(PathBuf::from(path));
        }
        if let Some(family) = non_blank(section.font_family) {
            render.font_family = Some(family);
        }
        if let Some(order) = non_blank(section.channel_order) {
            render.channel_order = order.parse::<ChannelOrder>()?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

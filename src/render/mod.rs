//! Draws translated text onto an image, either directly over the pixels near
//! the bottom edge (overlay) or inside a band appended below it (letterbox).

mod bitmap;
mod color;
mod font;
mod layout;
mod svg;
mod wrap;

use anyhow::anyhow;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::frame::ChannelOrder;

pub use color::Color;
pub use font::{load_font_metrics, resolve_font, FontMetrics, ResolvedFont};
pub use layout::PlacedLine;
pub use wrap::{wrap_text, Wrapped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    /// Overlay when the bitmap font covers the text, letterbox otherwise.
    #[default]
    Auto,
    Overlay,
    Letterbox,
}

impl RenderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderPolicy::Auto => "auto",
            RenderPolicy::Overlay => "overlay",
            RenderPolicy::Letterbox => "letterbox",
        }
    }
}

impl fmt::Display for RenderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(RenderPolicy::Auto),
            "overlay" => Ok(RenderPolicy::Overlay),
            "letterbox" | "band" => Ok(RenderPolicy::Letterbox),
            other => Err(anyhow!(
                "invalid render policy '{}' (expected auto, overlay or letterbox)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub policy: RenderPolicy,
    pub wrap_width: usize,
    pub break_long_words: bool,
    /// Left inset for both policies, and the gap between the overlay block
    /// and the bottom edge.
    pub margin: u32,
    pub overlay_line_height: u32,
    pub overlay_font_scale: u32,
    pub overlay_text_color: Color,
    pub band_height: u32,
    pub band_top_inset: u32,
    pub band_line_height: u32,
    pub band_font_size: f32,
    pub band_text_color: Color,
    pub band_background_color: Color,
    pub font_path: Option<PathBuf>,
    pub font_family: Option<String>,
    pub channel_order: ChannelOrder,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            policy: RenderPolicy::Auto,
            wrap_width: 60,
            break_long_words: true,
            margin: 10,
            overlay_line_height: 20,
            overlay_font_scale: 2,
            overlay_text_color: Color::BLACK,
            band_height: 100,
            band_top_inset: 20,
            band_line_height: 30,
            band_font_size: 20.0,
            band_text_color: Color::GREEN,
            band_background_color: Color::BLACK,
            font_path: None,
            font_family: None,
            channel_order: ChannelOrder::Rgb,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image: {width}x{height} (both dimensions must be positive)")]
    InvalidImage { width: u32, height: u32 },
    #[error("failed to load band font: {0:#}")]
    Font(anyhow::Error),
    #[error("failed to rasterize band: {0:#}")]
    Rasterize(anyhow::Error),
}

/// Non-fatal conditions met while rendering. The output is still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderIssue {
    /// Characters the active font cannot draw; each was replaced with a
    /// placeholder glyph.
    UnsupportedScript {
        policy: RenderPolicy,
        chars: Vec<char>,
    },
    /// A single word longer than the wrap width.
    OversizedWord { word: String, width: usize },
}

impl fmt::Display for RenderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderIssue::UnsupportedScript { policy, chars } => {
                let codepoints = chars
                    .iter()
                    .map(|ch| format!("U+{:04X}", *ch as u32))
                    .collect::<Vec<_>>();
                write!(
                    f,
                    "{} font cannot render {}; drew placeholders",
                    policy,
                    codepoints.join(" ")
                )
            }
            RenderIssue::OversizedWord { word, width } => write!(
                f,
                "word of {} characters exceeds wrap width {}: {}",
                wrap::char_len(word),
                width,
                word
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub image: RgbImage,
    /// The policy actually applied; never `Auto`.
    pub policy: RenderPolicy,
    pub lines: Vec<PlacedLine>,
    pub issues: Vec<RenderIssue>,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

pub fn render(
    image: &RgbImage,
    text: &str,
    config: &RenderConfig,
) -> Result<RenderedImage, RenderError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidImage { width, height });
    }

    let policy = resolve_policy(config.policy, text);
    let wrapped = wrap_text(text, config.wrap_width, config.break_long_words);
    let mut issues = wrapped
        .oversized
        .iter()
        .map(|word| RenderIssue::OversizedWord {
            word: word.clone(),
            width: config.wrap_width,
        })
        .collect::<Vec<_>>();

    let (image, lines) = match policy {
        RenderPolicy::Letterbox => render_letterbox(image, wrapped.lines, config, &mut issues)?,
        _ => render_overlay(image, wrapped.lines, config, &mut issues),
    };

    for issue in &issues {
        warn!("render: {}", issue);
    }

    Ok(RenderedImage {
        image,
        policy,
        lines,
        issues,
    })
}

pub fn resolve_policy(policy: RenderPolicy, text: &str) -> RenderPolicy {
    match policy {
        RenderPolicy::Auto => {
            if text.chars().all(bitmap::is_renderable) {
                RenderPolicy::Overlay
            } else {
                RenderPolicy::Letterbox
            }
        }
        explicit => explicit,
    }
}

fn render_overlay(
    image: &RgbImage,
    lines: Vec<String>,
    config: &RenderConfig,
    issues: &mut Vec<RenderIssue>,
) -> (RgbImage, Vec<PlacedLine>) {
    let layout = layout::overlay_layout(image.width(), image.height(), lines, config);
    let mut missing = Vec::new();
    for line in &layout.lines {
        for ch in bitmap::missing_chars(&line.text) {
            if !missing.contains(&ch) {
                missing.push(ch);
            }
        }
    }
    if !missing.is_empty() {
        issues.push(RenderIssue::UnsupportedScript {
            policy: RenderPolicy::Overlay,
            chars: missing,
        });
    }

    let mut canvas = image.clone();
    let color = config.overlay_text_color.to_rgb();
    for line in &layout.lines {
        bitmap::draw_line(
            &mut canvas,
            &line.text,
            line.x,
            line.y,
            config.overlay_font_scale,
            color,
        );
    }
    (canvas, layout.lines)
}

fn render_letterbox(
    image: &RgbImage,
    lines: Vec<String>,
    config: &RenderConfig,
    issues: &mut Vec<RenderIssue>,
) -> Result<(RgbImage, Vec<PlacedLine>), RenderError> {
    let (width, height) = image.dimensions();
    let mut layout = layout::letterbox_layout(width, height, lines, config);
    let mut canvas = RgbImage::from_pixel(
        layout.width,
        layout.height,
        config.band_background_color.to_rgb(),
    );
    image::imageops::replace(&mut canvas, image, 0, 0);
    if config.band_height == 0 || layout.lines.is_empty() {
        return Ok((canvas, layout.lines));
    }

    let font = resolve_font(
        config.font_path.as_deref(),
        config.font_family.as_deref(),
        font::fallback_families(),
    )
    .map_err(RenderError::Font)?;

    let mut missing = Vec::new();
    for line in &mut layout.lines {
        let (rewritten, absent) = font.metrics.substitute_missing(&line.text);
        line.text = rewritten;
        for ch in absent {
            if !missing.contains(&ch) {
                missing.push(ch);
            }
        }
    }
    if !missing.is_empty() {
        issues.push(RenderIssue::UnsupportedScript {
            policy: RenderPolicy::Letterbox,
            chars: missing,
        });
    }

    let style = svg::BandStyle {
        background: config.band_background_color,
        text_color: config.band_text_color,
        font_size: config.band_font_size,
        font: &font,
    };
    let document = svg::band_svg(width, config.band_height, height as i32, &layout.lines, &style);
    let band = svg::rasterize(&document, font.metrics.data()).map_err(RenderError::Rasterize)?;
    image::imageops::replace(&mut canvas, &band, 0, height as i64);
    Ok((canvas, layout.lines))
}

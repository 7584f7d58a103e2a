use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use resvg::render;
use std::sync::Arc;
use tiny_skia::Pixmap;
use usvg::{fontdb, Options, Tree};

use super::color::Color;
use super::font::ResolvedFont;
use super::layout::PlacedLine;

pub(crate) struct BandStyle<'a> {
    pub(crate) background: Color,
    pub(crate) text_color: Color,
    pub(crate) font_size: f32,
    pub(crate) font: &'a ResolvedFont,
}

/// Builds the SVG for a `width`×`height` band whose origin is `origin_y` on
/// the final canvas. Line positions are canvas coordinates (line-box tops).
pub(crate) fn band_svg(
    width: u32,
    height: u32,
    origin_y: i32,
    lines: &[PlacedLine],
    style: &BandStyle<'_>,
) -> String {
    let ascent = style.font.metrics.ascent_px(style.font_size);
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{fill}"/>"#,
        w = width,
        h = height,
        fill = style.background
    ));
    for line in lines {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="{size}" fill="{color}" font-family="{family}" xml:space="preserve">{text}</text>"#,
            x = line.x,
            y = (line.y - origin_y) as f32 + ascent,
            size = style.font_size,
            color = style.text_color,
            family = escape_xml(&style.font.family),
            text = escape_xml(&line.text)
        ));
    }
    svg.push_str("</svg>");
    svg
}

/// Rasterizes `svg` with only `font_data` available to the text layer, so the
/// output never depends on which fonts the host happens to have installed.
pub(crate) fn rasterize(svg: &str, font_data: &[u8]) -> Result<RgbImage> {
    let mut db = fontdb::Database::new();
    db.load_font_data(font_data.to_vec());
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty SVG size"))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
    Ok(pixmap_to_rgb(&pixmap))
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> RgbImage {
    let mut image = RgbImage::new(pixmap.width(), pixmap.height());
    for (pixel, source) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = source.demultiply();
        *pixel = Rgb([color.red(), color.green(), color.blue()]);
    }
    image
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

use serde::Serialize;

use super::RenderConfig;

/// A wrapped line and where it lands on the output canvas.
///
/// Overlay lines are positioned by their baseline, letterbox lines by the top
/// of their line box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// The first overlay line sits above the image when the block is taller
    /// than it.
    pub(crate) lines: Vec<PlacedLine>,
}

pub(crate) fn overlay_layout(
    width: u32,
    height: u32,
    lines: Vec<String>,
    config: &RenderConfig,
) -> Layout {
    let line_height = config.overlay_line_height as i32;
    let margin = config.margin as i32;
    let block_top = height as i32 - margin - line_height * lines.len() as i32;
    Layout {
        width,
        height,
        lines: place(lines, margin, block_top, line_height),
    }
}

pub(crate) fn letterbox_layout(
    width: u32,
    height: u32,
    lines: Vec<String>,
    config: &RenderConfig,
) -> Layout {
    let block_top = height as i32 + config.band_top_inset as i32;
    Layout {
        width,
        height: height + config.band_height,
        lines: place(
            lines,
            config.margin as i32,
            block_top,
            config.band_line_height as i32,
        ),
    }
}

fn place(lines: Vec<String>, x: i32, top: i32, step: i32) -> Vec<PlacedLine> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, text)| PlacedLine {
            text,
            x,
            y: top + step * idx as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|idx| format!("line {idx}")).collect()
    }

    #[test]
    fn overlay_block_sits_margin_above_bottom_edge() {
        let layout = overlay_layout(300, 150, lines(2), &RenderConfig::default());
        let ys = layout.lines.iter().map(|line| line.y).collect::<Vec<_>>();
        assert_eq!(ys, vec![100, 120]);
        assert!(layout.lines.iter().all(|line| line.x == 10));
        assert_eq!((layout.width, layout.height), (300, 150));
    }

    #[test]
    fn overlay_block_taller_than_image_starts_above_it() {
        let layout = overlay_layout(100, 40, lines(5), &RenderConfig::default());
        assert_eq!(layout.lines[0].y, 40 - 10 - 100);
        assert_eq!(layout.height, 40);
    }

    #[test]
    fn letterbox_lines_start_inside_the_band() {
        let layout = letterbox_layout(200, 100, lines(3), &RenderConfig::default());
        assert_eq!((layout.width, layout.height), (200, 200));
        let ys = layout.lines.iter().map(|line| line.y).collect::<Vec<_>>();
        assert_eq!(ys, vec![120, 150, 180]);
    }

    #[test]
    fn letterbox_band_is_not_resized_for_long_text() {
        let layout = letterbox_layout(200, 100, lines(8), &RenderConfig::default());
        assert_eq!(layout.height, 200);
        assert_eq!(layout.lines.last().map(|line| line.y), Some(120 + 30 * 7));
    }
}

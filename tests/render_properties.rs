use image::{Rgb, RgbImage};
use image_text_translator::render::{
    render, wrap_text, RenderConfig, RenderIssue, RenderPolicy, RenderedImage,
};
use std::path::PathBuf;

const SAMPLES: &[&str] = &[
    "",
    "hello world",
    "Welcome to Bengaluru. Please drive slowly near the school zone and watch for pedestrians.",
    "supercalifragilisticexpialidocious is long, pneumonoultramicroscopicsilicovolcanoconiosis is longer",
    "   leading and trailing spaces   \n with a newline ",
];

fn photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn config(policy: RenderPolicy) -> RenderConfig {
    RenderConfig {
        policy,
        ..RenderConfig::default()
    }
}

fn fixture_font() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/DejaVuSans.ttf"
    ))
}

fn render_letterbox(image: &RgbImage, text: &str) -> RenderedImage {
    let config = RenderConfig {
        font_path: Some(fixture_font()),
        ..config(RenderPolicy::Letterbox)
    };
    render(image, text, &config).expect("letterbox render")
}

#[test]
fn wrapped_lines_respect_the_width() {
    for width in [1, 5, 10, 20, 60] {
        for text in SAMPLES {
            let wrapped = wrap_text(text, width, true);
            for line in &wrapped.lines {
                assert!(line.chars().count() <= width, "{:?} at width {}", line, width);
            }
        }
    }
}

#[test]
fn unbroken_long_words_overflow_by_their_excess_only() {
    let width = 10;
    for text in SAMPLES {
        let wrapped = wrap_text(text, width, false);
        for line in &wrapped.lines {
            if line.chars().count() > width {
                assert!(!line.contains(' '), "{:?} should hold a single word", line);
                assert!(wrapped.oversized.contains(line));
                assert!(text.split_whitespace().any(|word| word == line));
            }
        }
    }
}

#[test]
fn output_keeps_width_and_never_shrinks() {
    let image = photo(240, 90);
    for text in SAMPLES.iter().filter(|text| text.is_ascii()) {
        let rendered = render(&image, text, &config(RenderPolicy::Overlay)).unwrap();
        assert_eq!(rendered.width(), 240);
        assert_eq!(rendered.height(), 90);

        let rendered = render_letterbox(&image, text);
        assert_eq!(rendered.width(), 240);
        assert_eq!(rendered.height(), 190);
    }
}

#[test]
fn empty_overlay_is_pixel_identical() {
    let image = photo(64, 48);
    let rendered = render(&image, "", &config(RenderPolicy::Overlay)).unwrap();
    assert_eq!(rendered.image.as_raw(), image.as_raw());
    assert!(rendered.lines.is_empty());
}

#[test]
fn letterbox_hello_world_gets_a_band() {
    let image = photo(200, 100);
    let rendered = render_letterbox(&image, "hello world");
    assert_eq!(rendered.image.dimensions(), (200, 200));
    assert_eq!(rendered.lines.len(), 1);
    assert_eq!(rendered.lines[0].text, "hello world");
    assert_eq!(rendered.lines[0].y, 120);
    assert_eq!(rendered.policy, RenderPolicy::Letterbox);

    for y in 0..100 {
        for x in 0..200 {
            assert_eq!(rendered.image.get_pixel(x, y), image.get_pixel(x, y));
        }
    }
    let inked_rows = (100..200)
        .filter(|&y| (0..200).any(|x| rendered.image.get_pixel(x, y)[1] > 128))
        .collect::<Vec<_>>();
    assert!(!inked_rows.is_empty());
    // Glyphs sit inside the band just below the line's top inset.
    assert!(inked_rows.iter().all(|&y| (120..150).contains(&y)), "{:?}", inked_rows);
}

#[test]
fn overlay_splits_a_long_unspaced_run() {
    let image = photo(300, 150);
    let text = "x".repeat(120);
    let rendered = render(&image, &text, &config(RenderPolicy::Overlay)).unwrap();
    assert_eq!(rendered.image.dimensions(), (300, 150));
    let lengths = rendered
        .lines
        .iter()
        .map(|line| line.text.chars().count())
        .collect::<Vec<_>>();
    assert_eq!(lengths, vec![60, 60]);
    let ys = rendered.lines.iter().map(|line| line.y).collect::<Vec<_>>();
    assert_eq!(ys, vec![100, 120]);
    assert!(matches!(
        rendered.issues.as_slice(),
        [RenderIssue::OversizedWord { width: 60, .. }]
    ));
}

#[test]
fn rendering_twice_gives_identical_bytes() {
    let image = photo(320, 120);
    let text = SAMPLES[2];
    let first = render(&image, text, &config(RenderPolicy::Overlay)).unwrap();
    let second = render(&image, text, &config(RenderPolicy::Overlay)).unwrap();
    assert_eq!(first.image.as_raw(), second.image.as_raw());

    let first = render_letterbox(&image, text);
    let second = render_letterbox(&image, text);
    assert_eq!(first.image.as_raw(), second.image.as_raw());
}

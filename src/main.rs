use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "image-text-translator",
    version,
    about = "Read text from an image, translate it, and draw the translation back onto the image"
)]
struct Cli {
    /// Image to translate (PNG or JPEG)
    image: Option<PathBuf>,

    /// Output path (default: <stem>_translated.png next to the input)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// OCR language hints joined with "+" (e.g. hin+kan+en)
    #[arg(short = 'O', long = "ocr-lang")]
    ocr_lang: Option<String>,

    /// Destination language: code or English name (default: en)
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// Source language. Use "auto" to detect.
    #[arg(short = 'L', long = "source-lang")]
    source_lang: Option<String>,

    /// Render policy: auto, overlay or letterbox
    #[arg(short = 'p', long = "policy")]
    policy: Option<String>,

    /// Characters per rendered line
    #[arg(short = 'w', long = "wrap-width")]
    wrap_width: Option<usize>,

    /// Font file for the letterbox band
    #[arg(long = "font")]
    font: Option<PathBuf>,

    /// Render this text instead of running OCR and translation
    #[arg(short = 't', long = "text")]
    text: Option<String>,

    /// Write raw pixels instead of PNG
    #[arg(long = "raw")]
    raw: bool,

    /// Channel order for --raw output: rgb or bgr
    #[arg(long = "channel-order")]
    channel_order: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<PathBuf>,

    /// Show supported translation languages and exit
    #[arg(long = "show-languages")]
    show_languages: bool,

    /// Show installed Tesseract languages and exit
    #[arg(long = "show-ocr-languages")]
    show_ocr_languages: bool,

    /// Serve the HTTP API and browser UI (e.g. 127.0.0.1:8080)
    #[arg(long = "server", num_args = 0..=1, default_missing_value = "")]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(addr) = cli.server {
        image_text_translator::logging::init(true)?;
        let settings = image_text_translator::settings::load_settings(cli.read_settings.as_deref())?;
        let addr = if addr.trim().is_empty() {
            settings.server_addr.clone()
        } else {
            addr
        };
        return image_text_translator::server::run_server(settings, addr).await;
    }

    image_text_translator::logging::init(cli.verbose)?;
    let output = image_text_translator::run(image_text_translator::Config {
        image: cli.image,
        output: cli.output,
        ocr_languages: cli.ocr_lang,
        lang: cli.lang,
        source_lang: cli.source_lang,
        policy: cli.policy,
        wrap_width: cli.wrap_width,
        font_path: cli.font,
        text: cli.text,
        raw: cli.raw,
        channel_order: cli.channel_order,
        settings_path: cli.read_settings,
        show_languages: cli.show_languages,
        show_ocr_languages: cli.show_ocr_languages,
    })
    .await?;

    println!("{}", output);
    Ok(())
}

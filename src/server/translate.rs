use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::Path;

use crate::frame;
use crate::pipeline::{self, PipelineError, PipelineRequest};
use crate::providers::Provider;
use crate::render::{RenderConfig, RenderError, RenderPolicy, RenderedImage};
use crate::settings::Settings;
use crate::translator::TranslateOptions;

use super::models::{ImageResponse, RenderRequest, TranslateRequest};
use super::state::ServerState;

const DEFAULT_FILE_NAME: &str = "translated_image.png";

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(format!("{:#}", err))
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::Decode(_) => StatusCode::BAD_REQUEST,
            PipelineError::Render(RenderError::InvalidImage { .. }) => StatusCode::BAD_REQUEST,
            PipelineError::Translate(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Ocr(_) | PipelineError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

pub(crate) async fn translate_request<P: Provider>(
    state: &ServerState<P>,
    request: TranslateRequest,
) -> Result<ImageResponse, ServerError> {
    let bytes = decode_upload(request.data_base64.as_deref())?;
    let settings = &state.settings;

    let options = TranslateOptions {
        lang: non_blank(request.lang).unwrap_or_else(|| settings.translate.lang.clone()),
        source_lang: non_blank(request.source_lang)
            .unwrap_or_else(|| settings.translate.source_lang.clone()),
    };
    state
        .registry
        .resolve_target(&options.lang)
        .map_err(|err| ServerError::bad_request(err.to_string()))?;
    state
        .registry
        .resolve_source(&options.source_lang)
        .map_err(|err| ServerError::bad_request(err.to_string()))?;
    let ocr_languages =
        non_blank(request.ocr_languages).unwrap_or_else(|| settings.ocr_languages.clone());
    let render = render_config(settings, request.policy.as_deref(), request.wrap_width)?;

    let output = pipeline::process(
        PipelineRequest {
            image_bytes: &bytes,
            ocr_languages: &ocr_languages,
            options,
            render,
        },
        state.extractor.as_ref(),
        &state.translator,
    )
    .await?;

    image_response(
        &output.rendered,
        Some(output.detected_text),
        output.translated_text,
        output.detected_source_lang,
        request.data_name.as_deref(),
    )
}

pub(crate) fn render_request(
    settings: &Settings,
    request: RenderRequest,
) -> Result<ImageResponse, ServerError> {
    let bytes = decode_upload(request.data_base64.as_deref())?;
    let text = request
        .text
        .ok_or_else(|| ServerError::bad_request("text is required"))?;
    let render = render_config(settings, request.policy.as_deref(), request.wrap_width)?;
    let rendered = pipeline::render_only(&bytes, &text, &render)?;
    image_response(&rendered, None, text, None, request.data_name.as_deref())
}

fn decode_upload(data_base64: Option<&str>) -> Result<Vec<u8>, ServerError> {
    let encoded = data_base64
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServerError::bad_request("data_base64 is required"))?;
    // Browsers hand over data URLs from FileReader.
    let encoded = match encoded.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => encoded,
    };
    let bytes = BASE64
        .decode(encoded)
        .map_err(|err| ServerError::bad_request(format!("invalid base64 data: {}", err)))?;
    match frame::sniff_image_mime(&bytes) {
        Some(mime) if frame::is_supported_upload(mime) => Ok(bytes),
        Some(mime) => Err(ServerError::bad_request(format!(
            "unsupported upload type: {} (expected PNG or JPEG)",
            mime
        ))),
        None => Err(ServerError::bad_request(
            "unsupported upload type (expected PNG or JPEG)",
        )),
    }
}

fn render_config(
    settings: &Settings,
    policy: Option<&str>,
    wrap_width: Option<usize>,
) -> Result<RenderConfig, ServerError> {
    let mut render = settings.render.clone();
    if let Some(policy) = policy.map(str::trim).filter(|value| !value.is_empty()) {
        render.policy = policy
            .parse::<RenderPolicy>()
            .map_err(|err| ServerError::bad_request(err.to_string()))?;
    }
    if let Some(width) = wrap_width {
        if width == 0 {
            return Err(ServerError::bad_request("wrap_width must be positive"));
        }
        render.wrap_width = width;
    }
    Ok(render)
}

fn image_response(
    rendered: &RenderedImage,
    detected_text: Option<String>,
    translated_text: String,
    detected_source_lang: Option<String>,
    data_name: Option<&str>,
) -> Result<ImageResponse, ServerError> {
    let png = frame::encode_png(&rendered.image)?;
    Ok(ImageResponse {
        detected_text,
        translated_text,
        detected_source_lang,
        mime: frame::PNG_MIME.to_string(),
        file_name: output_file_name(data_name),
        width: rendered.width(),
        height: rendered.height(),
        image_base64: BASE64.encode(png),
        policy: rendered.policy,
        warnings: rendered.issues.iter().map(ToString::to_string).collect(),
    })
}

fn output_file_name(data_name: Option<&str>) -> String {
    data_name
        .and_then(|name| Path::new(name.trim()).file_stem())
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{}_translated.png", stem))
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

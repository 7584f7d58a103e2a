use serde::{Deserialize, Serialize};

use crate::render::RenderPolicy;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct TranslateRequest {
    pub(crate) data_base64: Option<String>,
    pub(crate) data_name: Option<String>,
    pub(crate) ocr_languages: Option<String>,
    pub(crate) lang: Option<String>,
    pub(crate) source_lang: Option<String>,
    pub(crate) policy: Option<String>,
    pub(crate) wrap_width: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct RenderRequest {
    pub(crate) data_base64: Option<String>,
    pub(crate) data_name: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) policy: Option<String>,
    pub(crate) wrap_width: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detected_text: Option<String>,
    pub(crate) translated_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) detected_source_lang: Option<String>,
    pub(crate) mime: String,
    pub(crate) file_name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) image_base64: String,
    pub(crate) policy: RenderPolicy,
    pub(crate) warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SettingsInfo {
    pub(crate) ocr_languages: String,
    pub(crate) lang: String,
    pub(crate) source_lang: String,
    pub(crate) policy: RenderPolicy,
    pub(crate) wrap_width: usize,
    pub(crate) languages: Vec<LanguageOption>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LanguageOption {
    pub(crate) value: String,
    pub(crate) label: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

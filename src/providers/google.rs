use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{Provider, ProviderFuture, ProviderResponse, TranslationRequest};

pub(crate) const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Translate's public `translate_a/single` endpoint, the same one the
/// `googletrans` family of clients talks to. No key, no retries.
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    base_url: String,
    timeout: Duration,
}

impl Default for GoogleTranslate {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleTranslate {
    pub fn new() -> Self {
        Self {
            base_url: base_url(None),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `GOOGLE_TRANSLATE_BASE_URL` still wins over the configured endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<&str>) -> Self {
        self.base_url = base_url(endpoint);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }
}

impl Provider for GoogleTranslate {
    fn name(&self) -> &'static str {
        "google"
    }

    fn translate(&self, request: TranslationRequest) -> ProviderFuture {
        let provider = self.clone();
        Box::pin(async move { call_translate(provider, request).await })
    }
}

fn base_url(configured: Option<&str>) -> String {
    std::env::var("GOOGLE_TRANSLATE_BASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

async fn call_translate(
    provider: GoogleTranslate,
    request: TranslationRequest,
) -> Result<ProviderResponse> {
    let client = reqwest::Client::builder()
        .timeout(provider.timeout)
        .build()
        .with_context(|| "failed to build HTTP client")?;
    let url = format!("{}/translate_a/single", provider.base_url);
    debug!(
        "google: translating {} chars {} -> {}",
        request.text.chars().count(),
        request.source_lang,
        request.target_lang
    );

    // Long OCR text would overflow a GET URL, so `q` goes in the form body.
    let response = client
        .post(&url)
        .query(&[
            ("client", "gtx"),
            ("sl", request.source_lang.as_str()),
            ("tl", request.target_lang.as_str()),
            ("dt", "t"),
        ])
        .form(&[("q", request.text.as_str())])
        .send()
        .await
        .with_context(|| format!("failed to reach translation service at {}", url))?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(anyhow!(
            "translation service error ({}): {}",
            status,
            text.trim()
        ));
    }
    parse_response(&text)
}

/// The body is a positional array: `[0]` holds `[translated, original, ...]`
/// segments and `[2]` the detected source language.
pub(crate) fn parse_response(body: &str) -> Result<ProviderResponse> {
    let value: Value =
        serde_json::from_str(body).with_context(|| "failed to parse translation response")?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("translation response has no segments"))?;
    let mut text = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            text.push_str(part);
        }
    }
    let detected_source_lang = value
        .get(2)
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(ProviderResponse {
        text,
        detected_source_lang,
    })
}

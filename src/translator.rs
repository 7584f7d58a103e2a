use anyhow::{Context, Result};
use tracing::info;

use crate::languages::LanguageRegistry;
use crate::providers::{Provider, TranslationRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Destination language: code or English name.
    pub lang: String,
    /// Source language or `"auto"`.
    pub source_lang: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            source_lang: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translator<P: Provider + Clone> {
    provider: P,
    registry: LanguageRegistry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub text: String,
    pub detected_source_lang: Option<String>,
}

impl<P: Provider + Clone> Translator<P> {
    pub fn new(provider: P, registry: LanguageRegistry) -> Self {
        Self { provider, registry }
    }

    pub async fn exec(&self, input: &str, options: &TranslateOptions) -> Result<ExecutionOutput> {
        let target = self.registry.resolve_target(&options.lang)?;
        let source = self.registry.resolve_source(&options.source_lang)?;

        if input.trim().is_empty() {
            info!("translate: nothing to translate");
            return Ok(ExecutionOutput {
                text: String::new(),
                detected_source_lang: None,
            });
        }

        info!(
            "translate: {} chars via {} ({} -> {})",
            input.chars().count(),
            self.provider.name(),
            source,
            target.code
        );
        let response = self
            .provider
            .translate(TranslationRequest {
                text: input.to_string(),
                source_lang: source,
                target_lang: target.code.clone(),
            })
            .await
            .with_context(|| format!("{} translation failed", self.provider.name()))?;

        Ok(ExecutionOutput {
            text: response.text,
            detected_source_lang: response.detected_source_lang,
        })
    }
}

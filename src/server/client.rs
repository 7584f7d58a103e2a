use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

use crate::languages::LanguageRegistry;
use crate::settings::Settings;

use super::models::LanguageOption;

const CLIENT_TEMPLATE: &str = include_str!("templates/client.html.tera");

pub(crate) fn render_client_html(settings: &Settings, registry: &LanguageRegistry) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("default_ocr_languages", &settings.ocr_languages);
    context.insert("default_lang", &settings.translate.lang);
    context.insert("default_policy", settings.render.policy.as_str());
    context.insert("wrap_width", &settings.render.wrap_width);
    context.insert("languages", &language_options(registry));
    Tera::one_off(CLIENT_TEMPLATE, &context, true).with_context(|| "failed to render client template")
}

pub(crate) fn language_options(registry: &LanguageRegistry) -> Vec<LanguageOption> {
    registry
        .languages()
        .iter()
        .map(|lang| LanguageOption {
            value: lang.code.clone(),
            label: format!("{} ({})", lang.name, lang.autonym),
        })
        .collect()
}

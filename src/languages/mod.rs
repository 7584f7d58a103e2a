use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Language {
    /// Code sent to the translation service.
    pub code: String,
    pub iso3: String,
    /// Tesseract traineddata name.
    pub tesseract: String,
    pub name: String,
    pub autonym: String,
}

#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

#[derive(Debug, Deserialize)]
struct LanguageFile {
    language: Vec<Language>,
}

impl LanguageRegistry {
    pub fn load() -> Result<Self> {
        let raw = include_str!("languages.toml");
        let parsed: LanguageFile =
            toml::from_str(raw).with_context(|| "failed to parse language table")?;
        Ok(LanguageRegistry {
            languages: parsed.language,
        })
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Looks a language up by service code, ISO 639-2/3 code, Tesseract code
    /// or English name (`"hindi"`, `"kan"`, `"zh-CN"`, ...).
    pub fn find(&self, query: &str) -> Option<&Language> {
        let needle = normalize_code(query);
        if needle.is_empty() {
            return None;
        }
        self.languages
            .iter()
            .find(|lang| lang.code == needle)
            .or_else(|| self.languages.iter().find(|lang| lang.iso3 == needle))
            .or_else(|| {
                self.languages
                    .iter()
                    .find(|lang| normalize_code(&lang.tesseract) == needle)
            })
            .or_else(|| {
                self.languages
                    .iter()
                    .find(|lang| lang.name.eq_ignore_ascii_case(&needle))
            })
    }

    pub fn resolve_target(&self, query: &str) -> Result<&Language> {
        self.find(query).ok_or_else(|| {
            anyhow!(
                "unsupported target language '{}' (expected one of: {})",
                query.trim(),
                self.codes().join(", ")
            )
        })
    }

    /// Returns the service code for a source language, or `"auto"`.
    pub fn resolve_source(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() || query.trim().eq_ignore_ascii_case("auto") {
            return Ok("auto".to_string());
        }
        self.find(query)
            .map(|lang| lang.code.clone())
            .ok_or_else(|| anyhow!("unsupported source language '{}'", query.trim()))
    }

    /// Maps one OCR hint to a Tesseract code. Unknown hints pass through so
    /// installed traineddata outside the table still works.
    pub fn tesseract_code(&self, hint: &str) -> String {
        self.find(hint)
            .map(|lang| lang.tesseract.clone())
            .unwrap_or_else(|| hint.trim().to_string())
    }

    pub fn codes(&self) -> Vec<String> {
        self.languages.iter().map(|lang| lang.code.clone()).collect()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase().replace('_', "-")
}

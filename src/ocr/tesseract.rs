use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::warn;

use crate::languages::LanguageRegistry;

pub fn list_tesseract_languages() -> Result<Vec<String>> {
    let output = Command::new("tesseract")
        .arg("--list-langs")
        .output()
        .with_context(|| "failed to run tesseract --list-langs (is it installed?)")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("tesseract --list-langs failed: {}", stderr.trim()));
    }
    Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns a user hint such as `"hin+kan+en"` into the `+`-joined Tesseract
/// language list. Hints are mapped through the language table; when the
/// installed set is known, missing languages are dropped with a warning.
pub fn normalize_ocr_languages(
    requested: &str,
    registry: &LanguageRegistry,
    available: Option<&[String]>,
) -> Result<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("ocr languages is empty"));
    }

    let mut chosen: Vec<String> = Vec::new();
    let mut missing = Vec::new();
    for raw in trimmed.split(['+', ',', ' ']) {
        let hint = raw.trim();
        if hint.is_empty() {
            continue;
        }
        let code = registry.tesseract_code(hint);
        if chosen.contains(&code) {
            continue;
        }
        match available {
            Some(list) if !list.iter().any(|value| *value == code) => missing.push(code),
            _ => chosen.push(code),
        }
    }

    let available_list = available.map(|list| list.join(", ")).unwrap_or_default();
    if chosen.is_empty() {
        return Err(anyhow!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available_list
        ));
    }
    if !missing.is_empty() {
        warn!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available_list
        );
    }

    Ok(chosen.join("+"))
}

pub(super) fn run_tesseract_text(path: &Path, languages: &str) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(path)
        .arg("stdout")
        .arg("-l")
        .arg(languages)
        .arg("--psm")
        .arg("3")
        .output()
        .with_context(|| "failed to run tesseract (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("tesseract failed: {}", stderr.trim()));
    }
    // Tesseract ends each page with a form feed.
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LanguageRegistry {
        LanguageRegistry::load().expect("registry")
    }

    #[test]
    fn parses_list_langs_output() {
        let stdout = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nhin\n\nkan\n";
        assert_eq!(parse_language_list(stdout), vec!["eng", "hin", "kan"]);
    }

    #[test]
    fn maps_iso_hints_and_dedups() {
        let joined = normalize_ocr_languages("hin+kan+en, eng", &registry(), None).unwrap();
        assert_eq!(joined, "hin+kan+eng");
    }

    #[test]
    fn drops_languages_that_are_not_installed() {
        let installed = vec!["eng".to_string(), "kan".to_string()];
        let joined =
            normalize_ocr_languages("hin+kan+en", &registry(), Some(&installed)).unwrap();
        assert_eq!(joined, "kan+eng");
    }

    #[test]
    fn fails_when_nothing_is_installed() {
        let installed = vec!["eng".to_string()];
        let err = normalize_ocr_languages("hin", &registry(), Some(&installed)).unwrap_err();
        assert!(err.to_string().contains("not available: hin"));
        assert!(normalize_ocr_languages("  ", &registry(), None).is_err());
    }
}

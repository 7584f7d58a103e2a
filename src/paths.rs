use std::path::{Path, PathBuf};

const BASE_DIR_ENV: &str = "IMAGE_TEXT_TRANSLATOR_DIR";
const DEFAULT_DIR_NAME: &str = ".image-text-translator";

pub(crate) fn settings_dir() -> Option<PathBuf> {
    if let Some(dir) = base_dir_override() {
        return Some(dir);
    }
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(DEFAULT_DIR_NAME))
        }
    })
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV)
        .ok()
        .and_then(|value| normalize_dir(&value))
}

fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    let mut normalized = PathBuf::new();
    for component in Path::new(&expanded).components() {
        normalized.push(component.as_os_str());
    }
    Some(normalized)
}

fn expand_tilde(value: &str) -> String {
    if value == "~" || value.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let home = home.trim();
            if !home.is_empty() {
                return format!("{}{}", home, &value[1..]);
            }
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_against_home() {
        crate::test_util::with_temp_home(|home| {
            let expanded = expand_tilde("~/translator");
            assert_eq!(PathBuf::from(expanded), home.join("translator"));
            assert_eq!(expand_tilde("/abs/path"), "/abs/path");
        });
    }

    #[test]
    fn default_dir_lives_under_home() {
        crate::test_util::with_temp_home(|home| {
            assert_eq!(settings_dir(), Some(home.join(DEFAULT_DIR_NAME)));
        });
    }

    #[test]
    fn blank_override_is_ignored() {
        assert_eq!(normalize_dir("   "), None);
        assert_eq!(normalize_dir("/tmp//x/"), Some(PathBuf::from("/tmp/x")));
    }
}

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;
use ttf_parser::name_id;
use ttf_parser::Face;
use usvg::fontdb;

const REPLACEMENT: char = '\u{FFFD}';

#[cfg(target_os = "macos")]
pub(crate) fn fallback_families() -> &'static [&'static str] {
    &["Go Noto Current", "Noto Sans", "Arial Unicode MS", "sans-serif"]
}

#[cfg(target_os = "windows")]
pub(crate) fn fallback_families() -> &'static [&'static str] {
    &["Go Noto Current", "Noto Sans", "Nirmala UI", "sans-serif"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub(crate) fn fallback_families() -> &'static [&'static str] {
    &["Go Noto Current", "Noto Sans", "sans-serif"]
}

#[derive(Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    ascender: i16,
    family: Option<String>,
    face_index: u32,
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Distance from the top of a line box to the baseline at `font_size`.
    pub fn ascent_px(&self, font_size: f32) -> f32 {
        self.ascender.max(0) as f32 * font_size / self.units_per_em.max(1) as f32
    }

    /// Replaces characters the face has no glyph for. Returns the rewritten
    /// text and the distinct missing characters.
    pub(crate) fn substitute_missing(&self, text: &str) -> (String, Vec<char>) {
        let Ok(face) = Face::parse(&self.data, self.face_index) else {
            return (text.to_string(), Vec::new());
        };
        let placeholder = if face.glyph_index(REPLACEMENT).is_some() {
            REPLACEMENT
        } else {
            '?'
        };
        let mut missing = Vec::new();
        let rewritten = text
            .chars()
            .map(|ch| {
                if ch.is_whitespace() || face.glyph_index(ch).is_some() {
                    ch
                } else {
                    if !missing.contains(&ch) {
                        missing.push(ch);
                    }
                    placeholder
                }
            })
            .collect();
        (rewritten, missing)
    }
}

#[derive(Debug)]
pub struct ResolvedFont {
    pub metrics: FontMetrics,
    pub family: String,
}

fn font_cache() -> &'static Mutex<HashMap<PathBuf, FontMetrics>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, FontMetrics>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Loads a font file once per process; later calls reuse the parsed data.
pub fn load_font_metrics(path: &Path) -> Result<FontMetrics> {
    if let Ok(cache) = font_cache().lock() {
        if let Some(metrics) = cache.get(path) {
            return Ok(metrics.clone());
        }
    }
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    let metrics = load_font_metrics_from_data(&data, None)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))?;
    debug!("loaded font {} ({:?})", path.display(), metrics.family());
    if let Ok(mut cache) = font_cache().lock() {
        cache.insert(path.to_path_buf(), metrics.clone());
    }
    Ok(metrics)
}

pub fn resolve_font(
    font_path: Option<&Path>,
    font_family: Option<&str>,
    fallback: &[&str],
) -> Result<ResolvedFont> {
    if let Some(path) = font_path {
        let metrics = load_font_metrics(path)?;
        let family = metrics
            .family()
            .map(|name| name.to_string())
            .or_else(|| font_family.map(|name| name.to_string()))
            .unwrap_or_else(|| "sans-serif".to_string());
        return Ok(ResolvedFont { metrics, family });
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    if let Some(family) = font_family {
        return load_font_metrics_from_family(&db, family);
    }

    for candidate in fallback {
        if let Ok(resolved) = load_font_metrics_from_family(&db, candidate) {
            return Ok(resolved);
        }
    }

    if let Some(resolved) = first_installed_face(&db) {
        debug!(
            "font: none of [{}] installed, using {}",
            fallback.join(", "),
            resolved.family
        );
        return Ok(resolved);
    }

    Err(anyhow!(
        "no font found for the letterbox band (tried {} and no other fonts are installed); set render.font_path",
        fallback.join(", ")
    ))
}

/// Any parseable face in the database, in load order.
fn first_installed_face(db: &fontdb::Database) -> Option<ResolvedFont> {
    db.faces().find_map(|face| {
        let family = face.families.first().map(|(name, _)| name.clone());
        let data = db.with_face_data(face.id, |data, _index| data.to_vec())?;
        let metrics = load_font_metrics_from_data(&data, family.as_deref()).ok()?;
        let family = metrics
            .family()
            .map(|name| name.to_string())
            .or(family)?;
        Some(ResolvedFont { metrics, family })
    })
}

pub(crate) fn load_font_metrics_from_data(
    data: &[u8],
    preferred_family: Option<&str>,
) -> Result<FontMetrics> {
    let mut fallback = None;
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        if let Ok(face) = Face::parse(data, index) {
            let family = extract_family_name(&face);
            let metrics = FontMetrics {
                data: Arc::new(data.to_vec()),
                units_per_em: face.units_per_em().max(1),
                ascender: face.ascender(),
                family: family.clone(),
                face_index: index,
            };
            if let (Some(preferred), Some(found)) = (preferred_family, &family) {
                if found.eq_ignore_ascii_case(preferred) {
                    return Ok(metrics);
                }
            }
            if fallback.is_none() {
                fallback = Some(metrics);
            }
        }
    }
    if preferred_family.is_some() {
        if let Some(metrics) = fallback {
            return Ok(metrics);
        }
        return Err(anyhow!("font family not found in font file"));
    }
    fallback.ok_or_else(|| anyhow!("failed to parse font data"))
}

fn load_font_metrics_from_family(db: &fontdb::Database, family: &str) -> Result<ResolvedFont> {
    let families = if family.eq_ignore_ascii_case("sans-serif") {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    let metrics = load_font_metrics_from_data(&data, Some(family))?;
    let resolved_family = metrics
        .family()
        .map(|name| name.to_string())
        .unwrap_or_else(|| family.to_string());
    Ok(ResolvedFont {
        metrics,
        family: resolved_family,
    })
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use em_core::palette::PaletteSource;
use serde::Deserialize;

/// A manifest value is either a bare path or a `{ "path", "char" }` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(rename = "char")]
        glyph: Option<String>,
    },
}

/// Parse a manifest JSON object, entries in ascending name order.
///
/// # Errors
/// Returns an error on malformed JSON.
///
/// # Example
/// ```
/// use em_source::manifest::parse_manifest;
/// use std::path::Path;
/// let json = r#"{ "smile": "img/smile.png", "fire": { "path": "/abs/fire.png", "char": "🔥" } }"#;
/// let entries = parse_manifest(json, Path::new("/emoji")).unwrap();
/// assert_eq!(entries[0].name, "fire");
/// assert_eq!(entries[0].glyph.as_deref(), Some("🔥"));
/// assert_eq!(entries[1].path, Path::new("/emoji/img/smile.png"));
/// ```
pub fn parse_manifest(content: &str, base_dir: &Path) -> Result<Vec<PaletteSource>> {
    let raw: BTreeMap<String, RawEntry> = serde_json::from_str(content)?;
    Ok(raw
        .into_iter()
        .map(|(name, entry)| {
            let (path, glyph) = match entry {
                RawEntry::Path(path) => (path, None),
                RawEntry::Detailed { path, glyph } => (path, glyph),
            };
            let path = if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            };
            PaletteSource { name, path, glyph }
        })
        .collect())
}

/// Charge le manifeste des sources de palette.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_manifest(path: &Path) -> Result<Vec<PaletteSource>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let entries = parse_manifest(&content, path.parent().unwrap_or_else(|| Path::new("")))
        .with_context(|| format!("Manifeste JSON invalide : {}", path.display()))?;
    log::info!("Manifest {}: {} sources", path.display(), entries.len());
    Ok(entries)
}

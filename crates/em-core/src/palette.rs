use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::MosaicError;

/// One reference color of the palette, derived from a source image.
///
/// # Example
/// ```
/// use em_core::palette::PaletteEntry;
/// let e = PaletteEntry::new("fire", 230, 90, 20).with_glyph("🔥");
/// assert_eq!(e.display(), "🔥");
/// assert_eq!(PaletteEntry::new("ice", 0, 0, 0).display(), "ice");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaletteEntry {
    /// Unique key of the entry.
    pub name: String,
    /// Red channel of the average color.
    pub r: u8,
    /// Green channel of the average color.
    pub g: u8,
    /// Blue channel of the average color.
    pub b: u8,
    /// Glyph printed in emoji-art mode. Falls back to `name` when absent.
    #[serde(rename = "char", default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
}

impl PaletteEntry {
    /// Entry without glyph.
    #[must_use]
    pub fn new(name: impl Into<String>, r: u8, g: u8, b: u8) -> Self {
        Self {
            name: name.into(),
            r,
            g,
            b,
            glyph: None,
        }
    }

    /// Entry built from an averaged color.
    #[must_use]
    pub fn from_color(name: impl Into<String>, color: Rgb) -> Self {
        Self::new(name, color.r, color.g, color.b)
    }

    /// Attach a display glyph.
    #[must_use]
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = Some(glyph.into());
        self
    }

    /// Average color of the entry.
    #[inline(always)]
    #[must_use]
    pub fn color(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Text emitted for this entry in a glyph grid.
    #[must_use]
    pub fn display(&self) -> &str {
        self.glyph.as_deref().unwrap_or(&self.name)
    }
}

/// One source image to be indexed into the palette.
///
/// # Example
/// ```
/// use em_core::palette::PaletteSource;
/// let src = PaletteSource::new("smile", "emoji/smile.png");
/// assert_eq!(src.glyph, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteSource {
    /// Palette key.
    pub name: String,
    /// Source image path.
    pub path: PathBuf,
    /// Glyph attached to the resulting entry.
    pub glyph: Option<String>,
}

impl PaletteSource {
    /// Source without glyph.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            glyph: None,
        }
    }
}

/// Name → entry index, iterated in ascending name order.
///
/// The iteration order is the order of the persisted JSON object, so matching
/// tie-breaks are reproducible across runs.
///
/// # Example
/// ```
/// use em_core::palette::{Palette, PaletteEntry};
/// let palette = Palette::from_entries([
///     PaletteEntry::new("b", 10, 10, 10),
///     PaletteEntry::new("a", 0, 0, 0),
/// ]);
/// let names: Vec<_> = palette.iter().map(|e| e.name.as_str()).collect();
/// assert_eq!(names, ["a", "b"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: BTreeMap<String, PaletteEntry>,
}

impl Palette {
    /// Empty palette.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries. A later entry replaces an earlier one with the same name.
    pub fn from_entries(entries: impl IntoIterator<Item = PaletteEntry>) -> Self {
        let mut palette = Self::new();
        for entry in entries {
            palette.insert(entry);
        }
        palette
    }

    /// Insert or replace an entry, returning the replaced one.
    pub fn insert(&mut self, entry: PaletteEntry) -> Option<PaletteEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    /// Entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PaletteEntry> {
        self.entries.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the palette has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending name order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PaletteEntry> {
        self.entries.values()
    }

    /// Serialize as a pretty-printed JSON object with a trailing newline.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, MosaicError> {
        let mut out = serde_json::to_string_pretty(&self.entries)?;
        out.push('\n');
        Ok(out)
    }

    /// Parse a palette index.
    ///
    /// # Errors
    /// Returns `Json` on malformed input and `InvalidInput` when a key does
    /// not match the `name` of its entry.
    pub fn from_json_str(content: &str) -> Result<Self, MosaicError> {
        let entries: BTreeMap<String, PaletteEntry> = serde_json::from_str(content)?;
        if let Some((key, entry)) = entries.iter().find(|(key, entry)| **key != entry.name) {
            return Err(MosaicError::InvalidInput(format!(
                "palette key \"{key}\" does not match entry name \"{}\"",
                entry.name
            )));
        }
        Ok(Self { entries })
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Charge un index de palette depuis le disque.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_palette(path: &Path) -> Result<Palette, MosaicError> {
    let content = std::fs::read_to_string(path)?;
    let palette = Palette::from_json_str(&content)?;
    log::debug!(
        "Loaded palette of {} entries from {}",
        palette.len(),
        path.display()
    );
    Ok(palette)
}

/// Write a palette index to disk.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_palette(palette: &Palette, path: &Path) -> Result<(), MosaicError> {
    std::fs::write(path, palette.to_json_string()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Palette {
        Palette::from_entries([
            PaletteEntry::new("smile", 250, 200, 60).with_glyph("😀"),
            PaletteEntry::new("apple", 200, 20, 30),
            PaletteEntry::new("leaf", 40, 160, 50),
        ])
    }

    #[test]
    fn json_layout_is_sorted_and_pretty() {
        let json = Palette::from_entries([PaletteEntry::new("a", 1, 2, 3)])
            .to_json_string()
            .unwrap();
        assert_eq!(
            json,
            "{\n  \"a\": {\n    \"name\": \"a\",\n    \"r\": 1,\n    \"g\": 2,\n    \"b\": 3\n  }\n}\n"
        );
    }

    #[test]
    fn json_reserialization_is_byte_stable() {
        let first = sample().to_json_string().unwrap();
        let reloaded = Palette::from_json_str(&first).unwrap();
        assert_eq!(reloaded, sample());
        assert_eq!(reloaded.to_json_string().unwrap(), first);
    }

    #[test]
    fn glyph_is_persisted_as_char() {
        let json = sample().to_json_string().unwrap();
        assert!(json.contains("\"char\": \"😀\""));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let json = r#"{ "a": { "name": "b", "r": 0, "g": 0, "b": 0 } }"#;
        assert!(matches!(
            Palette::from_json_str(json),
            Err(MosaicError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            Palette::from_json_str("{ not json"),
            Err(MosaicError::Json(_))
        ));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        save_palette(&sample(), &path).unwrap();
        assert_eq!(load_palette(&path).unwrap(), sample());
    }
}

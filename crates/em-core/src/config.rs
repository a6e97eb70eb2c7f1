use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::MosaicError;

/// Block side used when neither the CLI nor the config file sets one.
pub const DEFAULT_BLOCK_SIZE: u32 = 5;

/// How the averaged blocks are turned into an artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum OutputMode {
    /// Solid-color rectangles, encoded as PNG.
    #[default]
    Flat,
    /// Nearest palette glyph per block, emitted as a text grid.
    Glyph,
}

/// Configuration complète d'un rendu mosaïque.
///
/// One object drives every pipeline variant: flat mosaics and emoji-art only
/// differ by `output_mode` and the palette they need.
///
/// # Example
/// ```
/// use em_core::config::{MosaicConfig, OutputMode};
/// let config = MosaicConfig::default();
/// assert_eq!(config.block_size, 5);
/// assert_eq!(config.output_mode, OutputMode::Flat);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MosaicConfig {
    /// Side length of the averaged blocks, in source pixels.
    pub block_size: u32,
    /// Source image.
    pub input: PathBuf,
    /// Flat raster or palette glyphs.
    pub output_mode: OutputMode,
    /// Destination file. Glyph mode prints to stdout when absent.
    pub output: Option<PathBuf>,
    /// Palette index, required by glyph mode.
    pub palette_path: Option<PathBuf>,
    /// Flat mode: pixels per block in the output. `None` keeps the block size.
    pub cell_size: Option<u32>,
    /// Flat mode: final raster resolution `[width, height]`.
    pub resize: Option<[u32; 2]>,
    /// Glyph mode: text emitted for fully transparent blocks.
    pub blank_glyph: String,
    /// Glyph mode: wrap glyphs in truecolor escape sequences.
    pub color: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            input: PathBuf::from("input.png"),
            output_mode: OutputMode::Flat,
            output: None,
            palette_path: None,
            cell_size: None,
            resize: None,
            blank_glyph: " ".to_string(),
            color: false,
        }
    }
}

impl MosaicConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a zero block or cell size, a zero resize
    /// target, glyph mode without palette, or flat mode without output path.
    pub fn validate(&self) -> Result<(), MosaicError> {
        if self.block_size == 0 {
            return Err(MosaicError::InvalidInput(
                "block size must be at least 1".into(),
            ));
        }
        if self.cell_size == Some(0) {
            return Err(MosaicError::InvalidInput(
                "cell size must be at least 1".into(),
            ));
        }
        if let Some([w, h]) = self.resize {
            if w == 0 || h == 0 {
                return Err(MosaicError::InvalidInput(format!(
                    "resize target {w}x{h} is empty"
                )));
            }
        }
        match self.output_mode {
            OutputMode::Glyph if self.palette_path.is_none() => Err(MosaicError::InvalidInput(
                "glyph output requires a palette index".into(),
            )),
            OutputMode::Flat if self.output.is_none() => Err(MosaicError::InvalidInput(
                "flat output requires an output image path".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    mosaic: MosaicSection,
}

/// Mosaic section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct MosaicSection {
    block_size: Option<u32>,
    input: Option<PathBuf>,
    output_mode: Option<OutputMode>,
    output: Option<PathBuf>,
    palette_path: Option<PathBuf>,
    cell_size: Option<u32>,
    resize: Option<[u32; 2]>,
    blank_glyph: Option<String>,
    color: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// Relative paths in the file are resolved against the file's directory.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
/// ```no_run
/// use em_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<MosaicConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content, path.parent().unwrap_or_else(|| Path::new("")))
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Configuration invalide : {}", path.display()))?;
    Ok(config)
}

/// Parse TOML content, resolving relative paths against `base_dir`.
///
/// # Errors
/// Returns an error if the content is not a valid config.
pub fn parse_config(content: &str, base_dir: &Path) -> Result<MosaicConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = MosaicConfig::default();
    let resolve = |p: PathBuf| {
        if p.is_relative() {
            base_dir.join(p)
        } else {
            p
        }
    };

    let m = file.mosaic;
    if let Some(v) = m.block_size {
        config.block_size = v;
    }
    if let Some(v) = m.input {
        config.input = resolve(v);
    }
    if let Some(v) = m.output_mode {
        config.output_mode = v;
    }
    if let Some(v) = m.output {
        config.output = Some(resolve(v));
    }
    if let Some(v) = m.palette_path {
        config.palette_path = Some(resolve(v));
    }
    if m.cell_size.is_some() {
        config.cell_size = m.cell_size;
    }
    if m.resize.is_some() {
        config.resize = m.resize;
    }
    if let Some(v) = m.blank_glyph {
        config.blank_glyph = v;
    }
    if let Some(v) = m.color {
        config.color = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let config = parse_config(
            "[mosaic]\ninput = \"cat.png\"\noutput = \"out.png\"\n",
            Path::new("/data"),
        )
        .unwrap();
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(config.input, PathBuf::from("/data/cat.png"));
        assert_eq!(config.output_mode, OutputMode::Flat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn glyph_mode_requires_palette() {
        let config = parse_config(
            "[mosaic]\noutput_mode = \"Glyph\"\nblock_size = 8\n",
            Path::new(""),
        )
        .unwrap();
        assert_eq!(config.block_size, 8);
        assert!(matches!(
            config.validate(),
            Err(MosaicError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let config = MosaicConfig {
            block_size: 0,
            output: Some(PathBuf::from("o.png")),
            ..MosaicConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn absolute_paths_are_kept() {
        let config = parse_config(
            "[mosaic]\npalette_path = \"/abs/data.json\"\nresize = [64, 32]\n",
            Path::new("/data"),
        )
        .unwrap();
        assert_eq!(config.palette_path, Some(PathBuf::from("/abs/data.json")));
        assert_eq!(config.resize, Some([64, 32]));
    }

    #[test]
    fn load_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.toml");
        std::fs::write(
            &path,
            "[mosaic]\noutput_mode = \"Glyph\"\npalette_path = \"data.json\"\ncolor = true\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.palette_path, Some(dir.path().join("data.json")));
        assert!(config.color);
    }

    #[test]
    fn bundled_default_config_is_valid() {
        let content = include_str!("../../../config/default.toml");
        let config = parse_config(content, Path::new("/repo/config")).unwrap();
        assert_eq!(config.block_size, 5);
        assert_eq!(config.output_mode, OutputMode::Flat);
        assert_eq!(config.input, PathBuf::from("/repo/config/../input/photo.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/mosaic.toml")).is_err());
    }
}

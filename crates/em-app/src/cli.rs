use std::path::PathBuf;

use clap::{Parser, Subcommand};
use em_core::config::{MosaicConfig, OutputMode};

/// emosaic: block mosaics and emoji-art from raster images.
#[derive(Parser, Debug)]
#[command(name = "emosaic", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index a manifest of images into a palette file (average color per entry).
    BuildPalette {
        /// JSON manifest: name -> path, or name -> { "path", "char" }.
        manifest: PathBuf,
        /// Palette index to write.
        output: PathBuf,
    },

    /// Render a flat-color block mosaic as PNG.
    Mosaic {
        /// Source image (PNG, JPEG, BMP, GIF).
        input: PathBuf,
        /// PNG to write.
        output: PathBuf,
        /// Block side in source pixels.
        block_size: u32,
        /// Output pixels per block. Défaut : la taille de bloc.
        #[arg(long)]
        cell_size: Option<u32>,
        /// Final resolution, e.g. 1920x1080.
        #[arg(long, value_parser = parse_resize)]
        resize: Option<[u32; 2]>,
    },

    /// Render an emoji-art text grid using a palette index.
    EmojiArt {
        /// Source image (PNG, JPEG, BMP, GIF).
        input: PathBuf,
        /// Palette index built by `build-palette`.
        palette: PathBuf,
        /// Block side in source pixels.
        block_size: u32,
        /// Colorer chaque glyphe (séquences ANSI truecolor).
        #[arg(long, default_value_t = false)]
        color: bool,
        /// Text emitted for fully transparent blocks.
        #[arg(long, default_value = " ")]
        blank: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the pipeline described by a TOML config file.
    Run {
        /// Fichier de configuration TOML.
        #[arg(short, long, default_value = "config/default.toml")]
        config: PathBuf,
    },
}

impl Command {
    /// Pipeline config for the `mosaic` and `emoji-art` subcommands.
    ///
    /// Returns `None` for subcommands that do not render an image.
    #[must_use]
    pub fn to_config(&self) -> Option<MosaicConfig> {
        match self {
            Self::Mosaic {
                input,
                output,
                block_size,
                cell_size,
                resize,
            } => Some(MosaicConfig {
                block_size: *block_size,
                input: input.clone(),
                output_mode: OutputMode::Flat,
                output: Some(output.clone()),
                cell_size: *cell_size,
                resize: *resize,
                ..MosaicConfig::default()
            }),
            Self::EmojiArt {
                input,
                palette,
                block_size,
                color,
                blank,
                output,
            } => Some(MosaicConfig {
                block_size: *block_size,
                input: input.clone(),
                output_mode: OutputMode::Glyph,
                output: output.clone(),
                palette_path: Some(palette.clone()),
                blank_glyph: blank.clone(),
                color: *color,
                ..MosaicConfig::default()
            }),
            Self::BuildPalette { .. } | Self::Run { .. } => None,
        }
    }
}

/// Parse `WIDTHxHEIGHT` (e.g. `1920x1080`).
///
/// # Errors
/// Returns a message if the format is wrong or a side is zero.
pub fn parse_resize(s: &str) -> Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("format attendu LARGEURxHAUTEUR, reçu '{s}'"))?;
    let w: u32 = w
        .trim()
        .parse()
        .map_err(|e| format!("largeur invalide '{w}': {e}"))?;
    let h: u32 = h
        .trim()
        .parse()
        .map_err(|e| format!("hauteur invalide '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("résolution nulle : {w}x{h}"));
    }
    Ok([w, h])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mosaic_arguments_map_to_flat_config() {
        let cli = Cli::try_parse_from([
            "emosaic", "mosaic", "in.jpg", "out.png", "5", "--cell-size", "1", "--resize",
            "1920x1080",
        ])
        .unwrap();
        let config = cli.command.to_config().unwrap();
        assert_eq!(config.output_mode, OutputMode::Flat);
        assert_eq!(config.block_size, 5);
        assert_eq!(config.output, Some(PathBuf::from("out.png")));
        assert_eq!(config.cell_size, Some(1));
        assert_eq!(config.resize, Some([1920, 1080]));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn emoji_art_arguments_map_to_glyph_config() {
        let cli = Cli::try_parse_from([
            "emosaic",
            "emoji-art",
            "in.png",
            "data.json",
            "10",
            "--color",
            "--blank",
            "..",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = cli.command.to_config().unwrap();
        assert_eq!(config.output_mode, OutputMode::Glyph);
        assert_eq!(config.palette_path, Some(PathBuf::from("data.json")));
        assert_eq!(config.blank_glyph, "..");
        assert!(config.color);
        assert!(config.output.is_none());
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn build_palette_has_no_render_config() {
        let cli = Cli::try_parse_from(["emosaic", "build-palette", "emojis.json", "data.json"])
            .unwrap();
        assert!(cli.command.to_config().is_none());
    }

    #[test]
    fn non_numeric_block_size_is_rejected() {
        assert!(Cli::try_parse_from(["emosaic", "mosaic", "a.png", "b.png", "big"]).is_err());
    }

    #[test]
    fn resize_format() {
        assert_eq!(parse_resize("64x32"), Ok([64, 32]));
        assert_eq!(parse_resize("64X32"), Ok([64, 32]));
        assert!(parse_resize("64").is_err());
        assert!(parse_resize("0x32").is_err());
        assert!(parse_resize("ax32").is_err());
    }
}

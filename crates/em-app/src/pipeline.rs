use std::path::Path;

use anyhow::{Context, Result, bail};
use em_core::config::{MosaicConfig, OutputMode};
use em_core::frame::{MosaicGrid, RgbaRaster};
use em_core::palette::{Palette, load_palette, save_palette};
use em_core::traits::MosaicRenderer;
use em_export::png::write_png;
use em_export::text::{write_text, write_text_file};
use em_mosaic::flat::FlatRenderer;
use em_mosaic::glyph::GlyphRenderer;
use em_mosaic::indexer::{PaletteBuild, build_palette_with_progress};
use em_source::image::{FileDecoder, load_grid};
use em_source::manifest::load_manifest;
use em_source::resize::resize_raster;

/// Rendered artifact, before it is written anywhere.
#[derive(Debug)]
pub enum Artifact {
    /// Flat-color mosaic.
    Raster(RgbaRaster),
    /// Emoji-art grid.
    Text(String),
}

/// Exécute le pipeline complet : décodage → calcul → encodage.
///
/// Flat output goes to `config.output` as PNG. Glyph output goes to
/// `config.output` when set, stdout otherwise.
///
/// # Errors
/// Returns an error if any stage fails.
pub fn run(config: &MosaicConfig) -> Result<()> {
    match render(config)? {
        Artifact::Raster(raster) => {
            let path = config
                .output
                .as_deref()
                .context("Chemin de sortie manquant pour le rendu flat")?;
            write_png(&raster, path)
        }
        Artifact::Text(text) => match config.output.as_deref() {
            Some(path) => write_text_file(&text, path),
            None => write_text(&text, &mut std::io::stdout().lock()),
        },
    }
}

/// Decode and compute stages, returning the artifact in memory.
///
/// The palette (glyph mode) is loaded once, before the image is decoded.
///
/// # Errors
/// Returns an error if the config is invalid, the palette or image cannot be
/// loaded, or rendering fails.
pub fn render(config: &MosaicConfig) -> Result<Artifact> {
    config.validate().context("Configuration invalide")?;

    let palette = match (config.output_mode, config.palette_path.as_deref()) {
        (OutputMode::Glyph, Some(path)) => Some(
            load_palette(path)
                .with_context(|| format!("Impossible de charger la palette {}", path.display()))?,
        ),
        _ => None,
    };
    if palette.as_ref().is_some_and(Palette::is_empty) {
        bail!(
            "La palette {} ne contient aucune entrée",
            config
                .palette_path
                .as_deref()
                .map_or_else(String::new, |p| p.display().to_string())
        );
    }

    // 1. Décodage
    let grid = load_grid(&config.input)?;

    // 2. Calcul
    let mosaic = em_mosaic::build_mosaic(&grid, config.block_size)
        .with_context(|| format!("Calcul de la mosaïque de {}", config.input.display()))?;
    log::info!(
        "Mosaic {}x{} cells (block {}px)",
        mosaic.columns(),
        mosaic.rows(),
        mosaic.block_size()
    );

    // 3. Rendu
    match palette {
        Some(palette) => render_glyphs(config, &palette, &mosaic).map(Artifact::Text),
        None => render_flat(config, &mosaic).map(Artifact::Raster),
    }
}

fn render_flat(config: &MosaicConfig, mosaic: &MosaicGrid) -> Result<RgbaRaster> {
    let renderer = FlatRenderer {
        cell_size: config.cell_size,
    };
    let raster = renderer
        .render(mosaic)
        .with_context(|| format!("Rendu {} échoué", renderer.name()))?;
    match config.resize {
        Some([w, h]) => resize_raster(&raster, w, h)
            .with_context(|| format!("Redimensionnement vers {w}x{h} échoué")),
        None => Ok(raster),
    }
}

fn render_glyphs(config: &MosaicConfig, palette: &Palette, mosaic: &MosaicGrid) -> Result<String> {
    let renderer = GlyphRenderer::new(palette)?
        .with_blank(config.blank_glyph.clone())
        .with_color(config.color);
    renderer
        .render(mosaic)
        .with_context(|| format!("Rendu {} échoué", renderer.name()))
}

/// Build a palette index from a manifest and write it to `output`.
///
/// Entries that fail to decode are skipped with a warning. Fails if the
/// manifest is non-empty and every entry was skipped.
///
/// # Errors
/// Returns an error if the manifest cannot be read, no entry could be
/// indexed, or the index cannot be written.
pub fn build_palette_command(manifest: &Path, output: &Path) -> Result<PaletteBuild> {
    let sources = load_manifest(manifest)?;
    log::info!(
        "Indexing {} sources from {}",
        sources.len(),
        manifest.display()
    );

    let build = build_palette_with_progress(&sources, &FileDecoder, |done, total| {
        if done.is_multiple_of(100) || done == total {
            log::info!("Indexed {done}/{total}");
        }
    });

    if !sources.is_empty() && build.palette.is_empty() {
        bail!(
            "Aucune entrée indexée : les {} sources de {} ont échoué",
            sources.len(),
            manifest.display()
        );
    }

    save_palette(&build.palette, output)
        .with_context(|| format!("Impossible d'écrire {}", output.display()))?;
    log::info!(
        "Wrote palette {} ({} entries, {} skipped)",
        output.display(),
        build.palette.len(),
        build.skipped.len()
    );
    Ok(build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_core::palette::PaletteEntry;
    use std::path::PathBuf;

    /// 4×4 image: red left half, blue right half, top-right block transparent.
    fn write_input(dir: &Path) -> PathBuf {
        let mut raster = RgbaRaster::new(4, 4);
        raster.fill_rect(0, 0, 2, 4, [255, 0, 0, 255]);
        raster.fill_rect(2, 2, 2, 2, [0, 0, 255, 255]);
        let path = dir.join("input.png");
        write_png(&raster, &path).unwrap();
        path
    }

    fn write_solid(path: &Path, rgba: [u8; 4]) {
        let mut raster = RgbaRaster::new(3, 3);
        raster.fill_rect(0, 0, 3, 3, rgba);
        write_png(&raster, path).unwrap();
    }

    #[test]
    fn flat_mosaic_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let config = MosaicConfig {
            block_size: 2,
            input: write_input(dir.path()),
            output: Some(output.clone()),
            ..MosaicConfig::default()
        };
        run(&config).unwrap();

        let grid = load_grid(&output).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert_eq!(grid.get(1, 1).rgb(), em_core::Rgb::new(255, 0, 0));
        assert_eq!(grid.get(3, 3).rgb(), em_core::Rgb::new(0, 0, 255));
        assert!(grid.get(3, 0).is_transparent());
    }

    #[test]
    fn flat_mosaic_with_cell_size_and_resize() {
        let dir = tempfile::tempdir().unwrap();
        let config = MosaicConfig {
            block_size: 2,
            input: write_input(dir.path()),
            output: Some(dir.path().join("out.png")),
            cell_size: Some(1),
            ..MosaicConfig::default()
        };
        let Artifact::Raster(small) = render(&config).unwrap() else {
            panic!("expected a raster");
        };
        assert_eq!((small.width, small.height), (2, 2));

        let config = MosaicConfig {
            resize: Some([8, 6]),
            ..config
        };
        let Artifact::Raster(big) = render(&config).unwrap() else {
            panic!("expected a raster");
        };
        assert_eq!((big.width, big.height), (8, 6));
        assert_eq!(big.pixel(0, 5), [255, 0, 0, 255]);
    }

    #[test]
    fn oversized_resize_is_reported_not_aborted() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let config = MosaicConfig {
            block_size: 2,
            input: write_input(dir.path()),
            output: Some(output.clone()),
            resize: Some([u32::MAX, u32::MAX]),
            ..MosaicConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("too large"));
        assert!(!output.exists());
    }

    #[test]
    fn emoji_art_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let palette_path = dir.path().join("data.json");
        let palette = Palette::from_entries([
            PaletteEntry::new("apple", 220, 20, 20).with_glyph("🍎"),
            PaletteEntry::new("wave", 20, 40, 230).with_glyph("🌊"),
        ]);
        save_palette(&palette, &palette_path).unwrap();

        let output = dir.path().join("art.txt");
        let config = MosaicConfig {
            block_size: 2,
            input: write_input(dir.path()),
            output_mode: OutputMode::Glyph,
            output: Some(output.clone()),
            palette_path: Some(palette_path),
            ..MosaicConfig::default()
        };
        run(&config).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "🍎 \n🍎🌊\n");
    }

    #[test]
    fn empty_palette_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let palette_path = dir.path().join("data.json");
        save_palette(&Palette::new(), &palette_path).unwrap();
        let config = MosaicConfig {
            input: dir.path().join("never-read.png"),
            output_mode: OutputMode::Glyph,
            palette_path: Some(palette_path),
            ..MosaicConfig::default()
        };
        let err = render(&config).unwrap_err();
        assert!(format!("{err:#}").contains("aucune entrée"));
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let config = MosaicConfig {
            block_size: 0,
            output: Some(PathBuf::from("out.png")),
            ..MosaicConfig::default()
        };
        assert!(render(&config).is_err());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = MosaicConfig {
            input: dir.path().join("missing.png"),
            output: Some(dir.path().join("out.png")),
            ..MosaicConfig::default()
        };
        assert!(run(&config).is_err());
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn palette_build_skips_broken_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(&dir.path().join("red.png"), [200, 0, 0, 255]);
        write_solid(&dir.path().join("ghost.png"), [0, 0, 0, 0]);
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let manifest = dir.path().join("emojis.json");
        std::fs::write(
            &manifest,
            r#"{"red": {"path": "red.png", "char": "🟥"}, "ghost": "ghost.png", "broken": "broken.png"}"#,
        )
        .unwrap();

        let output = dir.path().join("data.json");
        let build = build_palette_command(&manifest, &output).unwrap();
        assert_eq!(build.palette.len(), 1);
        assert_eq!(build.skipped.len(), 2);

        let saved = load_palette(&output).unwrap();
        let red = saved.get("red").unwrap();
        assert_eq!((red.r, red.g, red.b), (200, 0, 0));
        assert_eq!(red.glyph.as_deref(), Some("🟥"));
    }

    #[test]
    fn palette_build_fails_when_everything_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("emojis.json");
        std::fs::write(&manifest, r#"{"a": "missing-a.png", "b": "missing-b.png"}"#).unwrap();
        let output = dir.path().join("data.json");
        assert!(build_palette_command(&manifest, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn empty_manifest_writes_empty_palette() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("emojis.json");
        std::fs::write(&manifest, "{}").unwrap();
        let output = dir.path().join("data.json");
        let build = build_palette_command(&manifest, &output).unwrap();
        assert!(build.palette.is_empty());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}\n");
    }
}

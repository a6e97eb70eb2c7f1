use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use em_core::frame::RgbaRaster;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// Encode un raster RGBA en PNG sur disque.
///
/// The file is always PNG, whatever its extension.
///
/// # Errors
/// Returns an error if the raster is empty or the file cannot be written.
///
/// # Example
/// ```no_run
/// use em_core::frame::RgbaRaster;
/// use em_export::png::write_png;
/// use std::path::Path;
/// let raster = RgbaRaster::new(16, 16);
/// write_png(&raster, Path::new("output/mosaic.png")).unwrap();
/// ```
pub fn write_png(raster: &RgbaRaster, path: &Path) -> Result<()> {
    check_not_empty(raster)?;
    image::save_buffer_with_format(
        path,
        &raster.data,
        raster.width,
        raster.height,
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
    .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!(
        "Wrote {} ({}x{})",
        path.display(),
        raster.width,
        raster.height
    );
    Ok(())
}

/// Encode un raster RGBA en PNG en mémoire.
///
/// # Errors
/// Returns an error if the raster is empty or encoding fails.
///
/// # Example
/// ```
/// use em_core::frame::RgbaRaster;
/// use em_export::png::encode_png;
/// let bytes = encode_png(&RgbaRaster::new(2, 2)).unwrap();
/// assert_eq!(&bytes[1..4], b"PNG");
/// ```
pub fn encode_png(raster: &RgbaRaster) -> Result<Vec<u8>> {
    check_not_empty(raster)?;
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf)
        .write_image(
            &raster.data,
            raster.width,
            raster.height,
            ExtendedColorType::Rgba8,
        )
        .context("Échec de l'encodage PNG")?;
    Ok(buf.into_inner())
}

fn check_not_empty(raster: &RgbaRaster) -> Result<()> {
    if raster.width == 0 || raster.height == 0 {
        bail!(
            "Raster vide ({}x{}) : rien à encoder",
            raster.width,
            raster.height
        );
    }
    Ok(())
}

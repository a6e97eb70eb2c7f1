use std::path::Path;

use anyhow::{Context, Result};
use em_core::error::MosaicError;
use em_core::frame::PixelGrid;
use em_core::traits::ImageDecoder;

/// Décodeur d'images sur disque (PNG, JPEG, BMP, GIF) via le crate `image`.
///
/// # Example
/// ```no_run
/// use em_core::traits::ImageDecoder;
/// use em_source::image::FileDecoder;
/// use std::path::Path;
/// let grid = FileDecoder.decode(Path::new("emoji/smile.png")).unwrap();
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<PixelGrid, MosaicError> {
        let img = ::image::open(path).map_err(|e| MosaicError::DecodeFailure {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        to_grid(&img)
    }
}

/// Decode an in-memory encoded image (format guessed from its header).
///
/// # Errors
/// Returns `DecodeFailure` if the bytes are not a supported image.
///
/// # Example
/// ```
/// use em_source::image::decode_bytes;
/// assert!(decode_bytes(b"not an image").is_err());
/// ```
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelGrid, MosaicError> {
    let img = ::image::load_from_memory(bytes).map_err(|e| MosaicError::DecodeFailure {
        source_name: "<memory>".to_string(),
        reason: e.to_string(),
    })?;
    to_grid(&img)
}

fn to_grid(img: &::image::DynamicImage) -> Result<PixelGrid, MosaicError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelGrid::from_rgba(width, height, rgba.as_raw())
}

/// Convenance : charge une image en grille de pixels.
///
/// # Errors
/// Returns an error if the image cannot be loaded.
///
/// # Example
/// ```no_run
/// use em_source::image::load_grid;
/// use std::path::Path;
/// let grid = load_grid(Path::new("input/IMG_5052.JPG")).unwrap();
/// ```
pub fn load_grid(path: &Path) -> Result<PixelGrid> {
    let grid = FileDecoder
        .decode(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    log::info!(
        "Decoded {} ({}x{})",
        path.display(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}

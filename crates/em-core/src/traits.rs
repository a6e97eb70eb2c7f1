use std::path::Path;

use crate::error::MosaicError;
use crate::frame::{MosaicGrid, PixelGrid};

/// Décode une image source en grille de pixels.
///
/// Implémenté par : `FileDecoder` (crate `em-source`). Must be shareable
/// across the palette indexer's worker threads.
///
/// # Example
/// ```
/// use em_core::error::MosaicError;
/// use em_core::frame::PixelGrid;
/// use em_core::traits::ImageDecoder;
/// use std::path::Path;
///
/// struct Solid;
/// impl ImageDecoder for Solid {
///     fn decode(&self, _path: &Path) -> Result<PixelGrid, MosaicError> {
///         PixelGrid::from_rgba(1, 1, &[255, 0, 0, 255])
///     }
/// }
/// assert_eq!(Solid.decode(Path::new("x.png")).unwrap().width(), 1);
/// ```
pub trait ImageDecoder: Send + Sync {
    /// Decode the image at `path`.
    ///
    /// # Errors
    /// Returns `DecodeFailure` when the file is unreadable or corrupt.
    fn decode(&self, path: &Path) -> Result<PixelGrid, MosaicError>;
}

/// Turns a mosaic into an output artifact (raster, text grid, ...).
///
/// # Example
/// ```
/// use em_core::error::MosaicError;
/// use em_core::frame::MosaicGrid;
/// use em_core::traits::MosaicRenderer;
///
/// struct CountBlocks;
/// impl MosaicRenderer for CountBlocks {
///     type Output = usize;
///     fn render(&self, mosaic: &MosaicGrid) -> Result<usize, MosaicError> {
///         Ok(mosaic.cells().len())
///     }
///     fn name(&self) -> &'static str { "count" }
/// }
/// ```
pub trait MosaicRenderer {
    /// Produced artifact.
    type Output;

    /// Render the whole mosaic.
    ///
    /// # Errors
    /// Returns an error if a cell cannot be rendered.
    fn render(&self, mosaic: &MosaicGrid) -> Result<Self::Output, MosaicError>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}

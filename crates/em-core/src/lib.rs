/// Shared types, errors, and configuration for emosaic.
///
/// This crate contains the pixel and mosaic grids, the palette model and its
/// JSON persistence, and the traits the other workspace crates plug into.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod palette;
pub mod traits;

pub use color::Rgb;
pub use config::MosaicConfig;
pub use error::MosaicError;
pub use frame::{MosaicGrid, Pixel, PixelGrid, RgbaRaster};
pub use palette::{Palette, PaletteEntry, PaletteSource};

/// Re-exports pour accès par chemin sémantique.
pub mod grid {
    pub use crate::frame::{MosaicGrid, Pixel, PixelGrid};
}

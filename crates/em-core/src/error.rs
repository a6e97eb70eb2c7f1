use thiserror::Error;

/// Errors originating from the mosaic pipeline.
#[derive(Error, Debug)]
pub enum MosaicError {
    /// Malformed buffer, dimension mismatch, or invalid parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A source image could not be read or decoded.
    #[error("Failed to decode {source_name}: {reason}")]
    DecodeFailure {
        /// Palette name or path of the failing source.
        source_name: String,
        /// Underlying decoder message.
        reason: String,
    },

    /// Matching was attempted against a palette without entries.
    #[error("Palette is empty")]
    EmptyPalette,

    /// Every pixel of the averaged window is fully transparent.
    #[error("Block at ({x}, {y}) of size {size} is fully transparent")]
    UndefinedAverage {
        /// Left edge of the window.
        x: u32,
        /// Top edge of the window.
        y: u32,
        /// Window side length.
        size: u32,
    },

    /// Filesystem error while reading or writing a persisted file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed palette index or manifest.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

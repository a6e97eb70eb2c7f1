/// Mosaic engine for emosaic.
///
/// Averages pixel blocks, indexes palettes, matches nearest colors, and
/// renders mosaics as rasters or glyph grids.

pub mod average;
pub mod flat;
pub mod glyph;
pub mod indexer;
pub mod matcher;

pub use average::{average_block, average_whole, build_mosaic};
pub use indexer::{PaletteBuild, SkippedSource, build_palette, build_palette_with_progress};
pub use matcher::{Match, Matcher, match_nearest};

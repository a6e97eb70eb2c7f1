/// Écriture des artefacts finaux : rasters PNG et grilles de glyphes.

pub mod png;
pub mod text;

use std::sync::atomic::{AtomicUsize, Ordering};

use em_core::error::MosaicError;
use em_core::palette::{Palette, PaletteEntry, PaletteSource};
use em_core::traits::ImageDecoder;
use rayon::prelude::*;

use crate::average::average_whole;

/// A manifest entry left out of the palette, with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedSource {
    /// Palette key of the source.
    pub name: String,
    /// Why the source could not be indexed.
    pub reason: String,
}

/// Outcome of a palette build: the entries that succeeded and the ones skipped.
#[derive(Clone, Debug, Default)]
pub struct PaletteBuild {
    /// One entry per successfully indexed source.
    pub palette: Palette,
    /// Failed sources, sorted by name.
    pub skipped: Vec<SkippedSource>,
}

/// Index every source into a palette entry, in parallel.
///
/// See [`build_palette_with_progress`].
pub fn build_palette<D>(sources: &[PaletteSource], decoder: &D) -> PaletteBuild
where
    D: ImageDecoder + ?Sized,
{
    build_palette_with_progress(sources, decoder, |_, _| {})
}

/// Index every source into a palette entry, reporting `(done, total)` after each.
///
/// Each source is decoded and reduced to its whole-image average color.
/// A failing source (unreadable, corrupt, fully transparent) is recorded in
/// `skipped` and never aborts the batch. Completion order is arbitrary; the
/// resulting palette is keyed by name.
///
/// # Example
/// ```
/// use em_core::error::MosaicError;
/// use em_core::frame::PixelGrid;
/// use em_core::palette::PaletteSource;
/// use em_core::traits::ImageDecoder;
/// use em_mosaic::indexer::build_palette_with_progress;
/// use std::path::Path;
///
/// struct Red;
/// impl ImageDecoder for Red {
///     fn decode(&self, _path: &Path) -> Result<PixelGrid, MosaicError> {
///         PixelGrid::from_rgba(1, 1, &[255, 0, 0, 255])
///     }
/// }
///
/// let sources = [PaletteSource::new("red", "red.png")];
/// let build = build_palette_with_progress(&sources, &Red, |done, total| {
///     assert!(done <= total);
/// });
/// assert_eq!(build.palette.get("red").unwrap().r, 255);
/// assert!(build.skipped.is_empty());
/// ```
pub fn build_palette_with_progress<D, F>(
    sources: &[PaletteSource],
    decoder: &D,
    progress: F,
) -> PaletteBuild
where
    D: ImageDecoder + ?Sized,
    F: Fn(usize, usize) + Sync,
{
    let total = sources.len();
    let done = AtomicUsize::new(0);

    let results: Vec<Result<PaletteEntry, SkippedSource>> = sources
        .par_iter()
        .map(|source| {
            let result = index_source(source, decoder).map_err(|e| SkippedSource {
                name: source.name.clone(),
                reason: e.to_string(),
            });
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            match &result {
                Ok(entry) => log::debug!("[{n}/{total}] {} -> {}", entry.name, entry.color()),
                Err(skip) => log::warn!("[{n}/{total}] skipped {}: {}", skip.name, skip.reason),
            }
            progress(n, total);
            result
        })
        .collect();

    let mut build = PaletteBuild::default();
    for result in results {
        match result {
            Ok(entry) => {
                build.palette.insert(entry);
            }
            Err(skip) => build.skipped.push(skip),
        }
    }
    build.skipped.sort_by(|a, b| a.name.cmp(&b.name));

    log::info!(
        "Palette built: {} entries, {} skipped",
        build.palette.len(),
        build.skipped.len()
    );
    build
}

fn index_source<D>(source: &PaletteSource, decoder: &D) -> Result<PaletteEntry, MosaicError>
where
    D: ImageDecoder + ?Sized,
{
    let grid = decoder.decode(&source.path)?;
    let color = average_whole(&grid)?;
    let entry = PaletteEntry::from_color(source.name.clone(), color);
    Ok(match &source.glyph {
        Some(glyph) => entry.with_glyph(glyph.clone()),
        None => entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_core::frame::PixelGrid;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory decoder keyed by path; unknown paths fail like a missing file.
    struct FakeDecoder {
        images: HashMap<PathBuf, PixelGrid>,
    }

    impl FakeDecoder {
        fn new(images: &[(&str, [u8; 4])]) -> Self {
            Self {
                images: images
                    .iter()
                    .map(|(path, rgba)| {
                        (
                            PathBuf::from(path),
                            PixelGrid::from_rgba(1, 1, rgba).unwrap(),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl ImageDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<PixelGrid, MosaicError> {
            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| MosaicError::DecodeFailure {
                    source_name: path.display().to_string(),
                    reason: "no such file".into(),
                })
        }
    }

    #[test]
    fn failures_are_isolated() {
        let decoder = FakeDecoder::new(&[
            ("red.png", [255, 0, 0, 255]),
            ("ghost.png", [9, 9, 9, 0]),
            ("blue.png", [0, 0, 255, 255]),
        ]);
        let sources = [
            PaletteSource::new("red", "red.png"),
            PaletteSource::new("missing", "missing.png"),
            PaletteSource::new("ghost", "ghost.png"),
            PaletteSource::new("blue", "blue.png"),
        ];
        let build = build_palette(&sources, &decoder);

        let names: Vec<_> = build.palette.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["blue", "red"]);
        let skipped: Vec<_> = build.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, ["ghost", "missing"]);
        assert!(build.skipped[0].reason.contains("transparent"));
    }

    #[test]
    fn glyph_is_carried_over() {
        let decoder = FakeDecoder::new(&[("fire.png", [230, 90, 20, 255])]);
        let mut source = PaletteSource::new("fire", "fire.png");
        source.glyph = Some("🔥".into());
        let build = build_palette(&[source], &decoder);
        let entry = build.palette.get("fire").unwrap();
        assert_eq!(entry.glyph.as_deref(), Some("🔥"));
        assert_eq!(entry.color(), em_core::Rgb::new(230, 90, 20));
    }

    #[test]
    fn progress_reaches_total() {
        let decoder = FakeDecoder::new(&[("a.png", [1, 1, 1, 255])]);
        let sources: Vec<_> = (0..20)
            .map(|i| PaletteSource::new(format!("n{i}"), if i % 2 == 0 { "a.png" } else { "b.png" }))
            .collect();
        let seen = Mutex::new(Vec::new());
        let build = build_palette_with_progress(&sources, &decoder, |done, total| {
            seen.lock().unwrap().push((done, total));
        });
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen.len(), 20);
        assert_eq!(seen.last(), Some(&(20, 20)));
        assert_eq!(build.palette.len(), 10);
        assert_eq!(build.skipped.len(), 10);
    }

    #[test]
    fn empty_manifest_builds_empty_palette() {
        let build = build_palette(&[], &FakeDecoder::new(&[]));
        assert!(build.palette.is_empty());
        assert!(build.skipped.is_empty());
    }

    #[test]
    fn rebuild_serializes_identically() {
        let decoder = FakeDecoder::new(&[
            ("a.png", [10, 20, 30, 255]),
            ("b.png", [200, 100, 0, 255]),
        ]);
        let sources = [
            PaletteSource::new("b", "b.png"),
            PaletteSource::new("a", "a.png"),
        ];
        let first = build_palette(&sources, &decoder).palette.to_json_string().unwrap();
        let reloaded = Palette::from_json_str(&first).unwrap();
        assert_eq!(reloaded.to_json_string().unwrap(), first);
        let second = build_palette(&sources, &decoder).palette.to_json_string().unwrap();
        assert_eq!(second, first);
    }
}

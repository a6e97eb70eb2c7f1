use em_core::color::Rgb;
use em_core::error::MosaicError;
use em_core::palette::{Palette, PaletteEntry};

/// Palettes larger than this are searched through the bucket index.
pub const BUCKET_THRESHOLD: usize = 256;

/// log2 of the bucket width along each channel.
const BUCKET_SHIFT: u32 = 5;
/// Buckets per channel (256 >> 5).
const BUCKETS_PER_AXIS: i32 = 256 >> BUCKET_SHIFT;
const BUCKET_WIDTH: i32 = 1 << BUCKET_SHIFT;

/// Result of a nearest-color query.
#[derive(Clone, Copy, Debug)]
pub struct Match<'a> {
    /// Closest palette entry.
    pub entry: &'a PaletteEntry,
    /// Euclidean RGB distance between the target and `entry`.
    pub distance: f64,
}

/// Linear nearest-color search over the palette in iteration order.
///
/// Ties resolve to the first entry reaching the minimum distance.
///
/// # Errors
/// Returns `EmptyPalette` if the palette has no entries.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// use em_core::palette::{Palette, PaletteEntry};
/// use em_mosaic::matcher::match_nearest;
/// let palette = Palette::from_entries([
///     PaletteEntry::new("A", 0, 0, 0),
///     PaletteEntry::new("B", 10, 10, 10),
/// ]);
/// let m = match_nearest(Rgb::new(0, 0, 0), &palette).unwrap();
/// assert_eq!(m.entry.name, "A");
/// assert_eq!(m.distance, 0.0);
/// ```
pub fn match_nearest(target: Rgb, palette: &Palette) -> Result<Match<'_>, MosaicError> {
    let mut best: Option<(u32, &PaletteEntry)> = None;
    for entry in palette {
        let d = target.distance_sq(entry.color());
        if best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, entry));
        }
    }
    best.map(|(d, entry)| Match {
        entry,
        distance: f64::from(d).sqrt(),
    })
    .ok_or(MosaicError::EmptyPalette)
}

/// Uniform grid over RGB space; each bucket lists entry indices in palette order.
struct BucketIndex {
    buckets: Vec<Vec<u32>>,
}

impl BucketIndex {
    fn new(colors: &[Rgb]) -> Self {
        let axis = BUCKETS_PER_AXIS as usize;
        let mut buckets = vec![Vec::new(); axis * axis * axis];
        for (i, c) in colors.iter().enumerate() {
            let [r, g, b] = bucket_of(*c);
            buckets[Self::slot(r, g, b)].push(i as u32);
        }
        Self { buckets }
    }

    #[inline(always)]
    fn slot(r: i32, g: i32, b: i32) -> usize {
        ((r * BUCKETS_PER_AXIS + g) * BUCKETS_PER_AXIS + b) as usize
    }

    /// Search bucket shells of growing Chebyshev radius around the target.
    ///
    /// Every color in a shell of radius `ring >= 1` is at least
    /// `BUCKET_WIDTH * ring - (BUCKET_WIDTH - 1)` away on one channel, so the
    /// search stops once the best distance is strictly below that bound. A
    /// strict bound keeps equal-distance entries of later shells in play,
    /// which preserves the first-in-palette-order tie-break.
    fn nearest(&self, colors: &[Rgb], target: Rgb) -> usize {
        let center = bucket_of(target);
        let mut best: Option<(u32, u32)> = None;

        for ring in 0..BUCKETS_PER_AXIS {
            if ring > 0 {
                let bound = (BUCKET_WIDTH * ring - (BUCKET_WIDTH - 1)) as u32;
                if best.is_some_and(|(d, _)| d < bound * bound) {
                    break;
                }
            }
            for dr in -ring..=ring {
                for dg in -ring..=ring {
                    for db in -ring..=ring {
                        if dr.abs().max(dg.abs()).max(db.abs()) != ring {
                            continue;
                        }
                        let (r, g, b) = (center[0] + dr, center[1] + dg, center[2] + db);
                        if !(0..BUCKETS_PER_AXIS).contains(&r)
                            || !(0..BUCKETS_PER_AXIS).contains(&g)
                            || !(0..BUCKETS_PER_AXIS).contains(&b)
                        {
                            continue;
                        }
                        for &i in &self.buckets[Self::slot(r, g, b)] {
                            let d = target.distance_sq(colors[i as usize]);
                            if best.is_none_or(|best| (d, i) < best) {
                                best = Some((d, i));
                            }
                        }
                    }
                }
            }
        }

        // Shells up to BUCKETS_PER_AXIS - 1 cover the whole cube and the
        // palette is non-empty, so `best` is always set here.
        best.map_or(0, |(_, i)| i as usize)
    }
}

#[inline(always)]
fn bucket_of(c: Rgb) -> [i32; 3] {
    [
        i32::from(c.r >> BUCKET_SHIFT),
        i32::from(c.g >> BUCKET_SHIFT),
        i32::from(c.b >> BUCKET_SHIFT),
    ]
}

/// Nearest-color matcher bound to one loaded palette for a whole run.
///
/// Large palettes get a bucket index; results are identical to
/// [`match_nearest`], tie-breaks included.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// use em_core::palette::{Palette, PaletteEntry};
/// use em_mosaic::matcher::Matcher;
/// let palette = Palette::from_entries([
///     PaletteEntry::new("dark", 20, 20, 20),
///     PaletteEntry::new("light", 230, 230, 230),
/// ]);
/// let matcher = Matcher::new(&palette).unwrap();
/// assert_eq!(matcher.nearest(Rgb::new(200, 210, 190)).entry.name, "light");
/// ```
pub struct Matcher<'a> {
    entries: Vec<&'a PaletteEntry>,
    colors: Vec<Rgb>,
    index: Option<BucketIndex>,
}

impl<'a> Matcher<'a> {
    /// Build a matcher, indexing the palette when it is large.
    ///
    /// # Errors
    /// Returns `EmptyPalette` if the palette has no entries.
    pub fn new(palette: &'a Palette) -> Result<Self, MosaicError> {
        Self::build(palette, palette.len() > BUCKET_THRESHOLD)
    }

    /// Build a matcher that always uses the bucket index.
    ///
    /// # Errors
    /// Returns `EmptyPalette` if the palette has no entries.
    pub fn bucketed(palette: &'a Palette) -> Result<Self, MosaicError> {
        Self::build(palette, true)
    }

    fn build(palette: &'a Palette, indexed: bool) -> Result<Self, MosaicError> {
        if palette.is_empty() {
            return Err(MosaicError::EmptyPalette);
        }
        let entries: Vec<&PaletteEntry> = palette.iter().collect();
        let colors: Vec<Rgb> = entries.iter().map(|e| e.color()).collect();
        let index = indexed.then(|| BucketIndex::new(&colors));
        log::debug!(
            "Matcher over {} entries ({})",
            entries.len(),
            if index.is_some() { "bucketed" } else { "linear" }
        );
        Ok(Self {
            entries,
            colors,
            index,
        })
    }

    /// Closest entry to `target`.
    #[must_use]
    pub fn nearest(&self, target: Rgb) -> Match<'a> {
        let i = match &self.index {
            Some(index) => index.nearest(&self.colors, target),
            None => self.linear(target),
        };
        Match {
            entry: self.entries[i],
            distance: target.distance(self.colors[i]),
        }
    }

    fn linear(&self, target: Rgb) -> usize {
        let mut best = (u32::MAX, 0usize);
        for (i, c) in self.colors.iter().enumerate() {
            let d = target.distance_sq(*c);
            if d < best.0 {
                best = (d, i);
            }
        }
        best.1
    }

    /// Number of entries the matcher chooses from.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: empty palettes are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

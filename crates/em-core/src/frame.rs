use crate::color::Rgb;
use crate::error::MosaicError;

/// A single RGBA pixel. `a == 0` marks a fully transparent pixel.
///
/// # Example
/// ```
/// use em_core::frame::Pixel;
/// let p = Pixel::opaque(1, 2, 3);
/// assert!(!p.is_transparent());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel. 0 = fully transparent.
    pub a: u8,
}

impl Pixel {
    /// Build a pixel from its four channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque pixel.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True when the pixel must be ignored by averaging.
    #[inline(always)]
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Color channels with alpha dropped.
    #[inline(always)]
    #[must_use]
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Immutable pixel grid, row-major, built once per source image.
///
/// # Example
/// ```
/// use em_core::frame::PixelGrid;
/// let bytes = [1, 2, 3, 255, 4, 5, 6, 0];
/// let grid = PixelGrid::from_rgba(2, 1, &bytes).unwrap();
/// assert_eq!(grid.get(1, 0).b, 6);
/// assert!(grid.get(1, 0).is_transparent());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    pixels: Vec<Pixel>,
    width: u32,
    height: u32,
}

impl PixelGrid {
    /// Build a grid from a flat RGBA buffer.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `bytes.len() != width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<Self, MosaicError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                MosaicError::InvalidInput(format!("dimensions {width}x{height} overflow"))
            })?;
        if bytes.len() != expected {
            return Err(MosaicError::InvalidInput(format!(
                "RGBA buffer of {} bytes does not match {width}x{height} (expected {expected})",
                bytes.len()
            )));
        }

        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Pixel::new(px[0], px[1], px[2], px[3]))
            .collect();

        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Build a grid from already decoded pixels, row-major.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, MosaicError> {
        if pixels.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(MosaicError::InvalidInput(format!(
                "{} pixels do not fill a {width}x{height} grid",
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y). Panics when out of bounds.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Row `y` as a slice of exactly `width` pixels.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Iterate over the `height` rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        (0..self.height).map(move |y| self.row(y))
    }
}

/// Grid of averaged block colors, one cell per block, row-major.
///
/// `None` cells are blocks whose pixels were all transparent.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// use em_core::frame::MosaicGrid;
/// let grid = MosaicGrid::new(2, 1, 4, 8, 4, vec![Some(Rgb::new(1, 1, 1)), None]).unwrap();
/// assert_eq!(grid.get(0, 0), Some(Rgb::new(1, 1, 1)));
/// assert_eq!(grid.get(1, 0), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicGrid {
    cells: Vec<Option<Rgb>>,
    columns: u32,
    rows: u32,
    block_size: u32,
    source_width: u32,
    source_height: u32,
}

impl MosaicGrid {
    /// Assemble a mosaic from its cells.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `cells.len() != columns * rows`.
    pub fn new(
        columns: u32,
        rows: u32,
        block_size: u32,
        source_width: u32,
        source_height: u32,
        cells: Vec<Option<Rgb>>,
    ) -> Result<Self, MosaicError> {
        if cells.len() as u64 != u64::from(columns) * u64::from(rows) {
            return Err(MosaicError::InvalidInput(format!(
                "{} cells do not fill a {columns}x{rows} mosaic",
                cells.len()
            )));
        }
        Ok(Self {
            cells,
            columns,
            rows,
            block_size,
            source_width,
            source_height,
        })
    }

    /// Number of blocks per row.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of block rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of the blocks this mosaic was averaged from.
    #[must_use]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Dimensions of the source image.
    #[must_use]
    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// Cell at block column `x`, block row `y`.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.cells[y as usize * self.columns as usize + x as usize]
    }

    /// Iterate over the block rows, top to bottom.
    ///
    /// Always yields `rows` slices, empty ones when `columns == 0`.
    pub fn cell_rows(&self) -> impl Iterator<Item = &[Option<Rgb>]> {
        let width = self.columns as usize;
        (0..self.rows as usize).map(move |y| &self.cells[y * width..(y + 1) * width])
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Option<Rgb>] {
        &self.cells
    }
}

/// Owned RGBA raster produced by the flat renderer, 4 bytes per pixel.
///
/// # Example
/// ```
/// use em_core::frame::RgbaRaster;
/// let mut raster = RgbaRaster::new(4, 2);
/// raster.fill_rect(1, 0, 2, 2, [9, 8, 7, 255]);
/// assert_eq!(raster.pixel(2, 1), [9, 8, 7, 255]);
/// assert_eq!(raster.pixel(0, 0), [0, 0, 0, 0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaRaster {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RgbaRaster {
    /// Transparent raster of the given size.
    ///
    /// # Panics
    /// Panics if the buffer size overflows `usize` or cannot be allocated.
    /// Use [`RgbaRaster::try_new`] for sizes coming from user input.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; byte_len(width, height).unwrap_or(usize::MAX)],
            width,
            height,
        }
    }

    /// Transparent raster of the given size, failing instead of aborting.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `width × height × 4` overflows or the
    /// buffer cannot be allocated.
    ///
    /// # Example
    /// ```
    /// use em_core::frame::RgbaRaster;
    /// assert_eq!(RgbaRaster::try_new(3, 2).unwrap().data.len(), 24);
    /// assert!(RgbaRaster::try_new(u32::MAX, u32::MAX).is_err());
    /// ```
    pub fn try_new(width: u32, height: u32) -> Result<Self, MosaicError> {
        let too_large = || {
            MosaicError::InvalidInput(format!("raster {width}x{height} is too large to allocate"))
        };
        let len = byte_len(width, height).ok_or_else(too_large)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| too_large())?;
        data.resize(len, 0);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Pixel at (x, y) as `[r, g, b, a]`.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Fill a rectangle, clipped to the raster bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y.min(y_end)..y_end {
            let row = py as usize * self.width as usize;
            for px in x.min(x_end)..x_end {
                let idx = (row + px as usize) * 4;
                self.data[idx..idx + 4].copy_from_slice(&rgba);
            }
        }
    }
}

/// Taille en octets d'un raster RGBA, `None` en cas de dépassement.
#[inline(always)]
fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
}

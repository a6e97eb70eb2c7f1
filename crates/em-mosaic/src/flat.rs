use em_core::error::MosaicError;
use em_core::frame::{MosaicGrid, RgbaRaster};
use em_core::traits::MosaicRenderer;

/// Render a mosaic as solid-color rectangles (flat-color mode).
///
/// With `cell_size = None` each cell covers its source block and the raster
/// keeps the source dimensions: the dropped edge strips stay transparent.
/// With `Some(n)` each cell becomes an `n × n` square and the raster is
/// `columns·n × rows·n`. Fully transparent blocks stay `(0, 0, 0, 0)`.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// use em_core::frame::MosaicGrid;
/// use em_core::traits::MosaicRenderer;
/// use em_mosaic::flat::FlatRenderer;
///
/// let mosaic = MosaicGrid::new(1, 1, 2, 3, 2, vec![Some(Rgb::new(5, 6, 7))]).unwrap();
/// let raster = FlatRenderer::default().render(&mosaic).unwrap();
/// assert_eq!((raster.width, raster.height), (3, 2));
/// assert_eq!(raster.pixel(1, 1), [5, 6, 7, 255]);
/// assert_eq!(raster.pixel(2, 0), [0, 0, 0, 0]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatRenderer {
    /// Output pixels per cell side. `None` = the mosaic's block size.
    pub cell_size: Option<u32>,
}

impl FlatRenderer {
    /// Renderer with `n × n` pixels per cell.
    #[must_use]
    pub fn with_cell_size(n: u32) -> Self {
        Self { cell_size: Some(n) }
    }
}

impl MosaicRenderer for FlatRenderer {
    type Output = RgbaRaster;

    fn render(&self, mosaic: &MosaicGrid) -> Result<RgbaRaster, MosaicError> {
        let (cell, width, height) = match self.cell_size {
            Some(0) => {
                return Err(MosaicError::InvalidInput(
                    "cell size must be at least 1".into(),
                ));
            }
            Some(n) => {
                let w = mosaic.columns().checked_mul(n);
                let h = mosaic.rows().checked_mul(n);
                match (w, h) {
                    (Some(w), Some(h)) => (n, w, h),
                    _ => {
                        return Err(MosaicError::InvalidInput(format!(
                            "{}x{} cells of {n}px overflow the raster size",
                            mosaic.columns(),
                            mosaic.rows()
                        )));
                    }
                }
            }
            None => {
                let (w, h) = mosaic.source_size();
                (mosaic.block_size(), w, h)
            }
        };

        let mut raster = RgbaRaster::try_new(width, height)?;
        for (y, row) in mosaic.cell_rows().enumerate() {
            for (x, slot) in row.iter().enumerate() {
                if let Some(c) = slot {
                    raster.fill_rect(
                        x as u32 * cell,
                        y as u32 * cell,
                        cell,
                        cell,
                        [c.r, c.g, c.b, 255],
                    );
                }
            }
        }
        Ok(raster)
    }

    fn name(&self) -> &'static str {
        "flat"
    }
}

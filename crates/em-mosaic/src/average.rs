use em_core::color::{Rgb, rounded_mean};
use em_core::error::MosaicError;
use em_core::frame::{MosaicGrid, PixelGrid};

/// Average color of the `size × size` window whose top-left corner is (x, y).
///
/// Fully transparent pixels (`a == 0`) are skipped; each channel is rounded
/// half away from zero.
///
/// # Errors
/// - `InvalidInput` if `size == 0` or the window leaves the grid.
/// - `UndefinedAverage` if every pixel in the window is transparent.
///
/// # Example
/// ```
/// use em_core::frame::PixelGrid;
/// use em_mosaic::average::average_block;
/// let bytes = [0, 0, 0, 255, 255, 255, 255, 255, 255, 255, 255, 255, 0, 0, 0, 255];
/// let grid = PixelGrid::from_rgba(2, 2, &bytes).unwrap();
/// let c = average_block(&grid, 0, 0, 2).unwrap();
/// assert_eq!((c.r, c.g, c.b), (128, 128, 128));
/// ```
pub fn average_block(grid: &PixelGrid, x: u32, y: u32, size: u32) -> Result<Rgb, MosaicError> {
    if size == 0 {
        return Err(MosaicError::InvalidInput(
            "block size must be at least 1".into(),
        ));
    }
    let fits = |origin: u32, limit: u32| origin.checked_add(size).is_some_and(|end| end <= limit);
    if !fits(x, grid.width()) || !fits(y, grid.height()) {
        return Err(MosaicError::InvalidInput(format!(
            "block ({x}, {y}) of size {size} exceeds {}x{} grid",
            grid.width(),
            grid.height()
        )));
    }
    average_window(grid, x, y, size, size).ok_or(MosaicError::UndefinedAverage { x, y, size })
}

/// Average color of the whole image, alpha-aware, same rounding as blocks.
///
/// Used by the palette indexer to reduce a source image to one color. Works
/// for non-square images.
///
/// # Errors
/// Returns `UndefinedAverage` if the image is empty or fully transparent.
///
/// # Example
/// ```
/// use em_core::frame::PixelGrid;
/// use em_mosaic::average::average_whole;
/// let grid = PixelGrid::from_rgba(2, 1, &[10, 20, 30, 255, 99, 99, 99, 0]).unwrap();
/// let c = average_whole(&grid).unwrap();
/// assert_eq!((c.r, c.g, c.b), (10, 20, 30));
/// ```
pub fn average_whole(grid: &PixelGrid) -> Result<Rgb, MosaicError> {
    average_window(grid, 0, 0, grid.width(), grid.height()).ok_or(MosaicError::UndefinedAverage {
        x: 0,
        y: 0,
        size: grid.width().max(grid.height()),
    })
}

/// Sum the opaque pixels of a window already known to be in bounds.
/// `None` when no pixel counted.
fn average_window(grid: &PixelGrid, x: u32, y: u32, width: u32, height: u32) -> Option<Rgb> {
    let (mut sum_r, mut sum_g, mut sum_b) = (0u64, 0u64, 0u64);
    let mut count = 0u64;
    let x_range = x as usize..(x + width) as usize;

    for row in y..y + height {
        for p in &grid.row(row)[x_range.clone()] {
            if !p.is_transparent() {
                count += 1;
                sum_r += u64::from(p.r);
                sum_g += u64::from(p.g);
                sum_b += u64::from(p.b);
            }
        }
    }

    (count > 0).then(|| {
        Rgb::new(
            rounded_mean(sum_r, count),
            rounded_mean(sum_g, count),
            rounded_mean(sum_b, count),
        )
    })
}

/// Average every whole `size × size` block of the grid, row-major.
///
/// Block origins run over `0, size, ..` up to `dimension - size` inclusive;
/// trailing partial blocks on the right and bottom edges are dropped. Fully
/// transparent blocks become `None` cells.
///
/// # Errors
/// Returns `InvalidInput` if `size == 0`.
///
/// # Example
/// ```
/// use em_core::frame::PixelGrid;
/// use em_mosaic::average::build_mosaic;
/// let grid = PixelGrid::from_rgba(5, 3, &[255; 5 * 3 * 4]).unwrap();
/// let mosaic = build_mosaic(&grid, 2).unwrap();
/// assert_eq!((mosaic.columns(), mosaic.rows()), (2, 1));
/// ```
pub fn build_mosaic(grid: &PixelGrid, size: u32) -> Result<MosaicGrid, MosaicError> {
    if size == 0 {
        return Err(MosaicError::InvalidInput(
            "block size must be at least 1".into(),
        ));
    }
    let columns = grid.width() / size;
    let rows = grid.height() / size;
    let mut cells = Vec::with_capacity(columns as usize * rows as usize);
    let mut transparent = 0usize;

    for by in 0..rows {
        for bx in 0..columns {
            match average_block(grid, bx * size, by * size, size) {
                Ok(color) => cells.push(Some(color)),
                Err(MosaicError::UndefinedAverage { .. }) => {
                    transparent += 1;
                    cells.push(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    if transparent > 0 {
        log::debug!("{transparent} fully transparent blocks left empty");
    }
    MosaicGrid::new(
        columns,
        rows,
        size,
        grid.width(),
        grid.height(),
        cells,
    )
}

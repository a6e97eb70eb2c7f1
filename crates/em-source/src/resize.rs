use anyhow::{Context, Result, bail};
use em_core::frame::RgbaRaster;
use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer};

/// Met une mosaïque rendue à la résolution finale demandée (`--resize WxH`).
///
/// Sampling is nearest-neighbour: every output pixel copies one source pixel,
/// so block edges stay sharp and no blended color appears between cells. The
/// aspect ratio follows the target, not the source.
///
/// # Errors
/// Returns an error if the source or the target is empty, the target buffer
/// is too large to allocate, or the resize fails.
///
/// # Example
/// ```
/// use em_core::frame::RgbaRaster;
/// use em_source::resize::resize_raster;
/// let mut mosaic = RgbaRaster::new(2, 2);
/// mosaic.fill_rect(0, 0, 1, 2, [255, 0, 0, 255]);
/// let big = resize_raster(&mosaic, 20, 10).unwrap();
/// assert_eq!((big.width, big.height), (20, 10));
/// assert_eq!(big.pixel(9, 9), [255, 0, 0, 255]);
/// assert_eq!(big.pixel(10, 0), [0, 0, 0, 0]);
/// ```
pub fn resize_raster(src: &RgbaRaster, width: u32, height: u32) -> Result<RgbaRaster> {
    if src.width == 0 || src.height == 0 {
        bail!(
            "Mosaïque vide ({}x{}) : rien à redimensionner",
            src.width,
            src.height
        );
    }
    if width == 0 || height == 0 {
        bail!("Résolution cible nulle : {width}x{height}");
    }
    if (src.width, src.height) == (width, height) {
        return Ok(src.clone());
    }

    let mut dst = RgbaRaster::try_new(width, height)
        .with_context(|| format!("Résolution cible {width}x{height} impossible"))?;

    let src_view = ImageRef::new(src.width, src.height, &src.data, PixelType::U8x4)
        .context("Buffer source incohérent avec ses dimensions")?;
    let mut dst_view = Image::from_slice_u8(width, height, &mut dst.data, PixelType::U8x4)
        .context("Buffer cible incohérent avec ses dimensions")?;

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
    Resizer::new()
        .resize(&src_view, &mut dst_view, Some(&options))
        .with_context(|| {
            format!(
                "Échec du redimensionnement {}x{} -> {width}x{height}",
                src.width, src.height
            )
        })?;

    log::info!(
        "Resized mosaic {}x{} -> {width}x{height}",
        src.width,
        src.height
    );
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_blue() -> RgbaRaster {
        let mut src = RgbaRaster::new(2, 1);
        src.fill_rect(0, 0, 1, 1, [255, 0, 0, 255]);
        src.fill_rect(1, 0, 1, 1, [0, 0, 255, 255]);
        src
    }

    #[test]
    fn upscale_keeps_hard_edges() {
        let dst = resize_raster(&red_blue(), 4, 2).unwrap();
        assert_eq!(dst.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(dst.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(dst.pixel(2, 0), [0, 0, 255, 255]);
        assert_eq!(dst.pixel(3, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn downscale_only_picks_existing_colors() {
        let mut src = RgbaRaster::new(8, 8);
        src.fill_rect(0, 0, 4, 8, [10, 200, 30, 255]);
        src.fill_rect(4, 0, 4, 8, [0, 0, 0, 0]);
        let dst = resize_raster(&src, 3, 3).unwrap();
        for chunk in dst.data.chunks_exact(4) {
            assert!(chunk == [10, 200, 30, 255] || chunk == [0, 0, 0, 0]);
        }
    }

    #[test]
    fn same_size_is_a_copy() {
        let mut src = RgbaRaster::new(3, 3);
        src.fill_rect(1, 1, 1, 1, [1, 2, 3, 4]);
        assert_eq!(resize_raster(&src, 3, 3).unwrap(), src);
    }

    #[test]
    fn empty_source_or_target_is_rejected() {
        assert!(resize_raster(&RgbaRaster::new(0, 5), 4, 4).is_err());
        assert!(resize_raster(&red_blue(), 0, 4).is_err());
    }

    #[test]
    fn oversized_target_is_an_error() {
        let err = resize_raster(&red_blue(), u32::MAX, u32::MAX).unwrap_err();
        assert!(format!("{err:#}").contains("too large"));
    }
}

use super::resize::resize_exact;
use crate::cam::ActivationGrid;
use crate::error::{XRayError, XrResult};
use image::{Rgba, RgbaImage};

/// Maps every cell through `base^v`, keeping high activations separated and
/// flattening the low end. Visualization only; never used for scoring.
///
/// Evaluated as `base^(v - max)`, which differs from `base^v` by a constant
/// factor and so normalizes identically, but cannot overflow for large
/// activations.
pub fn exponential_remap(cam: &ActivationGrid, base: f32) -> ActivationGrid {
    let (_, max) = cam.min_max();
    if !max.is_finite() {
        return cam.map(|v| base.powf(v));
    }
    cam.map(|v| base.powf(v - max))
}

/// Rasterizes a CAM at grid resolution.
///
/// Every channel of `color`, alpha included, is scaled by the normalized
/// activation, so the coldest cell is fully transparent black.
pub fn rasterize(normalized: &ActivationGrid, color: Rgba<u8>) -> RgbaImage {
    let width = normalized.cols() as u32;
    let height = normalized.rows() as u32;

    // x is the column, y is the row
    RgbaImage::from_fn(width, height, |x, y| {
        let v = normalized.get(y as usize, x as usize);
        let Rgba([r, g, b, a]) = color;
        Rgba([scale(r, v), scale(g, v), scale(b, v), scale(a, v)])
    })
}

#[inline(always)]
fn scale(channel: u8, v: f32) -> u8 {
    // Truncates, matching a plain byte cast; `as` also saturates out-of-range values.
    (channel as f32 * v) as u8
}

/// Builds a `width x height` colour overlay for one CAM.
///
/// exponential remap -> normalize -> rasterize -> upscale (Lanczos3).
pub fn generate_color_map(
    cam: &ActivationGrid,
    color: Rgba<u8>,
    width: u32,
    height: u32,
    exp_base: f32,
) -> XrResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(XRayError::Validation(format!(
            "colour map size must be non-zero, got {}x{}",
            width, height
        )));
    }

    let normalized = exponential_remap(cam, exp_base).normalize();
    let raster = rasterize(&normalized, color);
    Ok(resize_exact(raster, width, height))
}

//! Stateless image operations: resize guard, CAM colour maps and blending.
pub mod blend;
pub mod colormap;
pub mod resize;

pub use self::blend::blend;
pub use self::colormap::{exponential_remap, generate_color_map, rasterize};
pub use self::resize::{resize_preserving_aspect_ratio, RESIZE_FILTER};

use crate::cam::ActivationGrid;
use crate::error::XrResult;
use image::{Rgba, RgbaImage};

/// Colours `cam` at the size of `background` and blends it on top.
pub fn render_overlay(
    background: &RgbaImage,
    cam: &ActivationGrid,
    color: Rgba<u8>,
    exp_base: f32,
) -> XrResult<RgbaImage> {
    let color_map = generate_color_map(
        cam,
        color,
        background.width(),
        background.height(),
        exp_base,
    )?;
    blend(background, &color_map)
}

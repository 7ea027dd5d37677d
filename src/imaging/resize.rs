use crate::consts::ASPECT_RATIO_EPSILON;
use crate::error::{XRayError, XrResult};
use image::imageops::FilterType;
use image::RgbaImage;
use std::borrow::Cow;
use tracing::debug;

/// Resampling filter used for every resize in the pipeline.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Scales `image` to `target_width x target_height`.
///
/// This is a guard, not a cropper: the aspect ratios must already agree.
/// An image that is already the right size is returned borrowed, untouched.
pub fn resize_preserving_aspect_ratio(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
) -> XrResult<Cow<'_, RgbaImage>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_width == 0 || target_height == 0 {
        return Err(XRayError::Validation(format!(
            "cannot resize {}x{} to {}x{}",
            width, height, target_width, target_height
        )));
    }

    let target_ratio = target_width as f64 / target_height as f64;
    let image_ratio = width as f64 / height as f64;

    if (target_ratio - image_ratio).abs() >= ASPECT_RATIO_EPSILON {
        return Err(XRayError::AspectRatioMismatch {
            width,
            height,
            target_width,
            target_height,
        });
    }

    if (width, height) == (target_width, target_height) {
        return Ok(Cow::Borrowed(image));
    }

    debug!(
        "Resizing image {}x{} -> {}x{}",
        width, height, target_width, target_height
    );
    Ok(Cow::Owned(image::imageops::resize(
        image,
        target_width,
        target_height,
        RESIZE_FILTER,
    )))
}

/// Resizes without the aspect-ratio guard; used to upscale CAM rasters.
pub(crate) fn resize_exact(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    image::imageops::resize(&image, width, height, RESIZE_FILTER)
}

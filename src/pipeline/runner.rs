use super::cancel::CancelToken;
use super::client::{Analysis, AnalysisPipeline};
use crate::error::XrResult;
use crate::imaging::resize_preserving_aspect_ratio;
use image::RgbaImage;
use tracing::debug;

/// Scales a square, already-cropped image to the pipeline input size and
/// analyzes it.
pub fn analyze(
    pipeline: &AnalysisPipeline,
    image: &RgbaImage,
    cancel: &CancelToken,
) -> XrResult<Analysis> {
    cancel.check()?;
    let size = pipeline.input_size();
    let scaled = resize_preserving_aspect_ratio(image, size, size)?;
    cancel.check()?;

    debug!("Pre-processed input to {}x{}", size, size);
    pipeline.analyze(&scaled, cancel)
}

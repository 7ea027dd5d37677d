use crate::error::{XRayError, XrResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Number of colour channels fed to the model (alpha is dropped).
pub const IMAGE_CHANNELS: usize = 3;

/// An inference engine behind a narrow interface.
///
/// `predict` returns the model's raw outputs in declaration order, exactly
/// as the engine flattened them. Engines are not assumed to be reentrant;
/// the pipeline serializes calls.
pub trait ImageModel: Send {
    fn predict(&mut self, image: &RgbaImage) -> XrResult<Vec<Vec<f32>>>;

    /// Releases engine resources. Called exactly once by the pipeline.
    fn close(&mut self) {}

    fn name(&self) -> &str {
        "model"
    }
}

/// Row-major `height x width x 3` float tensor of raw 0-255 RGB values.
pub fn extract_pixel_data(image: &RgbaImage) -> Vec<f32> {
    let mut data = Vec::with_capacity(image.width() as usize * image.height() as usize * IMAGE_CHANNELS);
    for pixel in image.pixels() {
        let [r, g, b, _] = pixel.0;
        data.extend_from_slice(&[r as f32, g as f32, b as f32]);
    }
    data
}

/// Recorded model outputs, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub name: String,
    pub outputs: Vec<Vec<f32>>,
}

/// Adapter that replays pre-recorded outputs for any input.
///
/// Lets the post-processing run without an inference engine.
pub struct ReplayModel {
    name: String,
    outputs: Vec<Vec<f32>>,
    closed: bool,
}

impl ReplayModel {
    pub fn new<S: Into<String>>(name: S, outputs: Vec<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            outputs,
            closed: false,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> XrResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            XRayError::ResourceLoad(format!(
                "could not read recording '{}': {}",
                path.display(),
                e
            ))
        })?;
        let rec: Recording = serde_json::from_str(&content)?;
        if rec.outputs.is_empty() {
            return Err(XRayError::ResourceLoad(format!(
                "recording '{}' has no outputs",
                path.display()
            )));
        }

        let name = if rec.name.is_empty() {
            path.display().to_string()
        } else {
            rec.name
        };
        info!("📼 Loaded recording '{}' ({} outputs)", name, rec.outputs.len());
        Ok(Self::new(name, rec.outputs))
    }

    /// Keeps only output `idx`; used to split one recording across the
    /// score and CAM adapters of a dual-model pipeline.
    pub fn select_output(&self, idx: usize) -> XrResult<Self> {
        let output = self.outputs.get(idx).cloned().ok_or_else(|| {
            XRayError::Model(format!(
                "recording '{}' has no output {}",
                self.name, idx
            ))
        })?;
        Ok(Self::new(format!("{}#{}", self.name, idx), vec![output]))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ImageModel for ReplayModel {
    fn predict(&mut self, image: &RgbaImage) -> XrResult<Vec<Vec<f32>>> {
        if self.closed {
            return Err(XRayError::Model(format!("'{}' is closed", self.name)));
        }
        debug!(
            "Replaying {} outputs for {}x{} input",
            self.outputs.len(),
            image.width(),
            image.height()
        );
        Ok(self.outputs.clone())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
